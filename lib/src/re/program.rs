/*! Compiled form of a pattern.

A [`Program`] is a graph of [`Term`]s stored in an arena and referenced by
[`TermId`]. Each term has a `next` successor, followed when the term
succeeds, and a `fail_next` successor, which is the alternative pushed into
the backtracking stack by branching terms or the path taken by conditions
that don't hold.

Some terms refer to other terms that are not part of the execution path.
For instance, a `REPEAT_0_INF` term has a `target` that describes the
character being repeated, the matcher never jumps to the target, it only
looks at it for counting how many times it matches.
*/

use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;

use crate::re::blockset::CodePointSet;
use crate::re::GroupMode;

/// Identifies a term in a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TermId(u32);

impl TermId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:05x}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Term {
    pub kind: TermKind,
    pub next: Option<TermId>,
    pub fail_next: Option<TermId>,
}

#[derive(Debug, Clone)]
pub(crate) enum TermKind {
    /// A single character.
    Char(char),
    /// Any character.
    AnyChar,
    /// Any character except line terminators.
    AnyCharNe,
    /// Any character in the set.
    Class(Box<CodePointSet>),
    /// Back-reference to the text captured by a group.
    Reg { group: usize, mode: GroupMode },

    /// Start of the target.
    Start,
    /// End of the target.
    End,
    /// End of the target, or before a line terminator that ends the target.
    EndEol,
    /// Start of a line.
    LineStart,
    /// End of a line.
    LineEnd,
    /// Where the previous match ended.
    LastMatchEnd,
    /// Boundary between characters in `class` and characters not in it.
    Boundary { class: Box<CodePointSet>, negated: bool },
    /// Start (or end) of a sequence of characters in `class`.
    Direction { class: Box<CodePointSet>, end: bool },

    /// Does nothing.
    Void,
    /// Records the position where a group starts.
    GroupIn(usize),
    /// Records the group as captured, from the position recorded by
    /// `GroupIn` up to the current position.
    GroupOut(usize),
    /// Pushes `fail_next` into the backtracking stack and continues with
    /// `next`.
    Branch,
    /// Like `Branch`, but the counter value is saved with the pushed entry.
    BranchStoreCnt,

    /// Greedy repetition of a single character term. These repetitions
    /// consume as many characters as possible and push an entry that gives
    /// them back one at a time when backtracking. The entry continues with
    /// the repetition's `fail_next`, which is one of the backtrack terms
    /// below.
    Repeat0Inf { target: TermId },
    RepeatMinInf { target: TermId, min: u32 },
    RepeatMinMax { target: TermId, min: u32, max: u32 },
    /// Greedy repetition of a back-reference.
    RepeatRegMinInf { target: TermId, min: u32 },
    RepeatRegMinMax { target: TermId, min: u32, max: u32 },

    /// Gives back one character of a greedy repetition with no minimum.
    Backtrack0,
    /// Gives back one character of a greedy repetition, as long as more
    /// than `min` repetitions remain.
    BacktrackMin { min: u32 },
    /// Gives back one repetition of a back-reference.
    BacktrackRegMin { min: u32 },
    /// Gives back characters until the character described by `target`
    /// appears `distance` positions after the current one. Created by the
    /// optimizer.
    BacktrackFindMin { target: TermId, min: u32, distance: usize, eat: bool },
    /// Like `BacktrackFindMin`, but the target is a back-reference.
    BacktrackFindRegMin {
        target: TermId,
        min: u32,
        distance: usize,
        eat: bool,
    },

    /// Scans the input forward looking for the character described by
    /// `target` at `distance` positions from the current one. Created by
    /// the optimizer.
    Find { target: TermId, distance: usize, eat: bool },

    /// Sets the counter of the current backtracking entry to zero.
    CntSet0,
    /// Increments the counter of the current backtracking entry.
    CntInc,
    /// Succeeds if the counter is greater than or equal to the value.
    CntGtEq(u32),
    /// Loads the counter saved in the backtracking entry and succeeds if
    /// it is lower than the maximum.
    ReadCntLt(Option<u32>),

    /// Resets a loop counter.
    CrSet0(usize),
    /// Increments a loop counter, saving the previous value.
    CrStoreCrInc(usize),
    /// Succeeds if the loop counter is lower than the value.
    CrLt(usize, u32),
    /// Succeeds if the loop counter is greater than or equal to the value.
    CrGtEq(usize, u32),
    /// Saves the current position in a loop slot.
    PosStore(usize),
    /// Succeeds if the current position is different from the one saved in
    /// the loop slot, which means that the loop made progress.
    PosCheck(usize),

    PLookaheadIn(usize),
    PLookaheadOut(usize),
    NLookaheadIn(usize),
    NLookaheadOut(usize),
    PLookbehindIn { la: usize, distance: usize },
    PLookbehindOut(usize),
    NLookbehindIn { la: usize, distance: usize },
    NLookbehindOut(usize),
    IndependentIn(usize),
    IndependentOut(usize),
    LookaheadConditionIn(usize),
    LookaheadConditionOut(usize),
    LookbehindConditionIn { la: usize, distance: usize },
    LookbehindConditionOut(usize),
    /// Continues with `next` if the group was captured, and with
    /// `fail_next` if not.
    MemregCondition(usize),

    Success,
}

impl TermKind {
    /// True for terms that match exactly one character.
    pub fn is_char_matcher(&self) -> bool {
        matches!(
            self,
            TermKind::Char(_)
                | TermKind::AnyChar
                | TermKind::AnyCharNe
                | TermKind::Class(_)
        )
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub terms: Vec<Term>,
    /// Entry point used for anchored searches.
    pub root0: TermId,
    /// Entry point used for unanchored searches. Equal to `root0` unless
    /// the optimizer added a scanning term in front of it.
    pub root: TermId,
    pub group_count: usize,
    pub counter_count: usize,
    pub lookaround_count: usize,
    pub names: FxHashMap<String, usize>,
}

impl Program {
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            root0: TermId(0),
            root: TermId(0),
            group_count: 1,
            counter_count: 0,
            lookaround_count: 0,
            names: FxHashMap::default(),
        }
    }

    /// Adds a term with no successors.
    pub fn push(&mut self, kind: TermKind) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(Term { kind, next: None, fail_next: None });
        id
    }
}

impl Index<TermId> for Program {
    type Output = Term;

    #[inline]
    fn index(&self, id: TermId) -> &Self::Output {
        &self.terms[id.index()]
    }
}

impl IndexMut<TermId> for Program {
    #[inline]
    fn index_mut(&mut self, id: TermId) -> &mut Self::Output {
        &mut self.terms[id.index()]
    }
}

impl Display for TermKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TermKind::Char(c) => write!(f, "CHAR {:?}", c),
            TermKind::AnyChar => write!(f, "ANY_CHAR"),
            TermKind::AnyCharNe => write!(f, "ANY_CHAR_NE"),
            TermKind::Class(set) if set.is_large() => {
                write!(f, "BITSET2 weight={} {}", set.weight(), set)
            }
            TermKind::Class(set) => write!(f, "BITSET {}", set),
            TermKind::Reg { group, mode } if mode.is_empty() => {
                write!(f, "REG {}", group)
            }
            TermKind::Reg { group, mode } => {
                write!(f, "REG {} {:?}", group, mode)
            }
            TermKind::Start => write!(f, "START"),
            TermKind::End => write!(f, "END"),
            TermKind::EndEol => write!(f, "END_EOL"),
            TermKind::LineStart => write!(f, "LINE_START"),
            TermKind::LineEnd => write!(f, "LINE_END"),
            TermKind::LastMatchEnd => write!(f, "LAST_MATCH_END"),
            TermKind::Boundary { negated: false, .. } => write!(f, "BOUNDARY"),
            TermKind::Boundary { negated: true, .. } => {
                write!(f, "UBOUNDARY")
            }
            TermKind::Direction { end: false, .. } => write!(f, "DIRECTION"),
            TermKind::Direction { end: true, .. } => {
                write!(f, "UDIRECTION")
            }
            TermKind::Void => write!(f, "VOID"),
            TermKind::GroupIn(n) => write!(f, "GROUP_IN {}", n),
            TermKind::GroupOut(n) => write!(f, "GROUP_OUT {}", n),
            TermKind::Branch => write!(f, "BRANCH"),
            TermKind::BranchStoreCnt => write!(f, "BRANCH_STORE_CNT"),
            TermKind::Repeat0Inf { target } => {
                write!(f, "REPEAT_0_INF {}", target)
            }
            TermKind::RepeatMinInf { target, min } => {
                write!(f, "REPEAT_MIN_INF {} min={}", target, min)
            }
            TermKind::RepeatMinMax { target, min, max } => {
                write!(f, "REPEAT_MIN_MAX {} min={} max={}", target, min, max)
            }
            TermKind::RepeatRegMinInf { target, min } => {
                write!(f, "REPEAT_REG_MIN_INF {} min={}", target, min)
            }
            TermKind::RepeatRegMinMax { target, min, max } => write!(
                f,
                "REPEAT_REG_MIN_MAX {} min={} max={}",
                target, min, max
            ),
            TermKind::Backtrack0 => write!(f, "BACKTRACK_0"),
            TermKind::BacktrackMin { min } => {
                write!(f, "BACKTRACK_MIN min={}", min)
            }
            TermKind::BacktrackRegMin { min } => {
                write!(f, "BACKTRACK_REG_MIN min={}", min)
            }
            TermKind::BacktrackFindMin { target, min, distance, eat } => {
                write!(
                    f,
                    "BACKTRACK_FIND_MIN {} min={} distance={}",
                    target, min, distance
                )?;
                if *eat {
                    write!(f, " eat")?;
                }
                Ok(())
            }
            TermKind::BacktrackFindRegMin { target, min, distance, eat } => {
                write!(
                    f,
                    "BACKTRACK_FINDREG_MIN {} min={} distance={}",
                    target, min, distance
                )?;
                if *eat {
                    write!(f, " eat")?;
                }
                Ok(())
            }
            TermKind::Find { target, distance, eat } => {
                write!(f, "FIND {} distance={}", target, distance)?;
                if *eat {
                    write!(f, " eat")?;
                }
                Ok(())
            }
            TermKind::CntSet0 => write!(f, "CNT_SET_0"),
            TermKind::CntInc => write!(f, "CNT_INC"),
            TermKind::CntGtEq(min) => write!(f, "CNT_GT_EQ {}", min),
            TermKind::ReadCntLt(Some(max)) => write!(f, "READ_CNT_LT {}", max),
            TermKind::ReadCntLt(None) => write!(f, "READ_CNT_LT inf"),
            TermKind::CrSet0(c) => write!(f, "CR_SET_0 {}", c),
            TermKind::CrStoreCrInc(c) => write!(f, "CRSTORE_CRINC {}", c),
            TermKind::CrLt(c, max) => write!(f, "CR_LT {} {}", c, max),
            TermKind::CrGtEq(c, min) => write!(f, "CR_GT_EQ {} {}", c, min),
            TermKind::PosStore(c) => write!(f, "POS_STORE {}", c),
            TermKind::PosCheck(c) => write!(f, "POS_CHECK {}", c),
            TermKind::PLookaheadIn(la) => write!(f, "PLOOKAHEAD_IN {}", la),
            TermKind::PLookaheadOut(la) => write!(f, "PLOOKAHEAD_OUT {}", la),
            TermKind::NLookaheadIn(la) => write!(f, "NLOOKAHEAD_IN {}", la),
            TermKind::NLookaheadOut(la) => write!(f, "NLOOKAHEAD_OUT {}", la),
            TermKind::PLookbehindIn { la, distance } => {
                write!(f, "PLOOKBEHIND_IN {} distance={}", la, distance)
            }
            TermKind::PLookbehindOut(la) => {
                write!(f, "PLOOKBEHIND_OUT {}", la)
            }
            TermKind::NLookbehindIn { la, distance } => {
                write!(f, "NLOOKBEHIND_IN {} distance={}", la, distance)
            }
            TermKind::NLookbehindOut(la) => {
                write!(f, "NLOOKBEHIND_OUT {}", la)
            }
            TermKind::IndependentIn(la) => write!(f, "INDEPENDENT_IN {}", la),
            TermKind::IndependentOut(la) => {
                write!(f, "INDEPENDENT_OUT {}", la)
            }
            TermKind::LookaheadConditionIn(la) => {
                write!(f, "LOOKAHEAD_CONDITION_IN {}", la)
            }
            TermKind::LookaheadConditionOut(la) => {
                write!(f, "LOOKAHEAD_CONDITION_OUT {}", la)
            }
            TermKind::LookbehindConditionIn { la, distance } => write!(
                f,
                "LOOKBEHIND_CONDITION_IN {} distance={}",
                la, distance
            ),
            TermKind::LookbehindConditionOut(la) => {
                write!(f, "LOOKBEHIND_CONDITION_OUT {}", la)
            }
            TermKind::MemregCondition(n) => {
                write!(f, "MEMREG_CONDITION {}", n)
            }
            TermKind::Success => write!(f, "SUCCESS"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        for (index, term) in self.terms.iter().enumerate() {
            let id = TermId(index as u32);
            // Detached targets are not dumped on their own, they are shown
            // as part of the term that refers to them.
            if term.next.is_none()
                && term.fail_next.is_none()
                && term.kind.is_char_matcher()
            {
                writeln!(f, "{}: ({})", id, term.kind)?;
                continue;
            }
            write!(f, "{}: {}", id, term.kind)?;
            if let Some(next) = term.next {
                write!(f, " -> {}", next)?;
            }
            if let Some(fail) = term.fail_next {
                write!(f, " | {}", fail)?;
            }
            if id == self.root && self.root != self.root0 {
                write!(f, " <root>")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
