/*! Compiles an [`Ast`] into a [`Program`].

The compiler works with fragments. A fragment is a piece of the term graph
with a single entry point and a list of dangling edges, called holes, that
must be connected to whatever comes after the fragment. Compiling a node of
the syntax tree produces a fragment, and fragments are combined by patching
the holes of one fragment with the entry point of the next one. When the
whole tree has been compiled, the remaining holes are connected to the
`SUCCESS` term.
*/

#[cfg(feature = "logging")]
use log::*;

use crate::re::ast::{
    Assertion, Ast, Condition, Conditional, GroupKind, Repetition,
};
use crate::re::parser::ParsedPattern;
use crate::re::program::{Program, TermId, TermKind};


/// A dangling edge in a fragment.
#[derive(Debug, Clone, Copy)]
enum Hole {
    /// The `next` successor of the term.
    Next(TermId),
    /// The `fail_next` successor of the term.
    Fail(TermId),
}

struct Frag {
    entry: TermId,
    holes: Vec<Hole>,
}

/// Compiles the syntax tree of a pattern into a graph of terms.
pub(crate) struct Compiler {
    program: Program,
}

impl Compiler {
    pub fn new() -> Self {
        Self { program: Program::new() }
    }

    pub fn compile(mut self, parsed: ParsedPattern) -> Program {
        let frag = self.compile_ast(&parsed.ast);
        let success = self.program.push(TermKind::Success);
        self.patch(&frag.holes, success);

        self.program.root0 = frag.entry;
        self.program.root = frag.entry;
        self.program.group_count = parsed.group_count;
        self.program.names = parsed.names;

        #[cfg(feature = "logging")]
        debug!(
            "compiled pattern into {} terms, {} groups",
            self.program.terms.len(),
            self.program.group_count
        );

        self.program
    }

    fn term(&mut self, kind: TermKind) -> TermId {
        self.program.push(kind)
    }

    fn single(&mut self, kind: TermKind) -> Frag {
        let id = self.term(kind);
        Frag { entry: id, holes: vec![Hole::Next(id)] }
    }

    fn link(&mut self, from: TermId, to: TermId) {
        self.program[from].next = Some(to);
    }

    fn link_fail(&mut self, from: TermId, to: TermId) {
        self.program[from].fail_next = Some(to);
    }

    fn patch(&mut self, holes: &[Hole], to: TermId) {
        for hole in holes {
            match *hole {
                Hole::Next(id) => self.link(id, to),
                Hole::Fail(id) => self.link_fail(id, to),
            }
        }
    }

    fn new_counter(&mut self) -> usize {
        self.program.counter_count += 1;
        self.program.counter_count - 1
    }

    fn new_lookaround(&mut self) -> usize {
        self.program.lookaround_count += 1;
        self.program.lookaround_count - 1
    }

    /// Returns the term kind for expressions that match a single character
    /// or a back-reference.
    fn atom_kind(ast: &Ast) -> Option<TermKind> {
        match ast {
            Ast::Literal(c) => Some(TermKind::Char(*c)),
            Ast::Class(set) => Some(TermKind::Class(set.clone())),
            Ast::Any { dot_all: true } => Some(TermKind::AnyChar),
            Ast::Any { dot_all: false } => Some(TermKind::AnyCharNe),
            Ast::BackRef { group, mode } => {
                Some(TermKind::Reg { group: *group, mode: *mode })
            }
            _ => None,
        }
    }

    fn compile_ast(&mut self, ast: &Ast) -> Frag {
        if let Some(kind) = Self::atom_kind(ast) {
            return self.single(kind);
        }
        match ast {
            Ast::Empty => self.single(TermKind::Void),
            Ast::Assertion(assertion) => self.single(match assertion {
                Assertion::Start => TermKind::Start,
                Assertion::End => TermKind::End,
                Assertion::EndOfLine => TermKind::EndEol,
                Assertion::LineStart => TermKind::LineStart,
                Assertion::LineEnd => TermKind::LineEnd,
                Assertion::LastMatchEnd => TermKind::LastMatchEnd,
            }),
            Ast::Boundary { word, negated } => self.single(TermKind::Boundary {
                class: word.clone(),
                negated: *negated,
            }),
            Ast::Direction { word, end } => self.single(TermKind::Direction {
                class: word.clone(),
                end: *end,
            }),
            Ast::Concat(items) => self.compile_concat(items),
            Ast::Alternation(alternatives) => {
                self.compile_alternation(alternatives)
            }
            Ast::Group(group) => self.compile_group(group.kind, &group.body),
            Ast::Conditional(cond) => self.compile_conditional(cond),
            Ast::Repetition(rep) => self.compile_repetition(rep),
            // Atoms were handled above.
            _ => self.single(TermKind::Void),
        }
    }

    fn compile_concat(&mut self, items: &[Ast]) -> Frag {
        let mut items = items.iter();
        let mut frag = match items.next() {
            Some(first) => self.compile_ast(first),
            None => return self.single(TermKind::Void),
        };
        for item in items {
            let next = self.compile_ast(item);
            self.patch(&frag.holes, next.entry);
            frag.holes = next.holes;
        }
        frag
    }

    /// Alternatives are tried in order, each one of them except the last
    /// one is preceded by a `BRANCH` that pushes the remaining alternatives.
    fn compile_alternation(&mut self, alternatives: &[Ast]) -> Frag {
        let mut holes = Vec::new();
        let mut entry = None;
        let mut prev_branch: Option<TermId> = None;

        for (i, alternative) in alternatives.iter().enumerate() {
            let frag = self.compile_ast(alternative);
            holes.extend(frag.holes);

            let start = if i + 1 < alternatives.len() {
                let branch = self.term(TermKind::Branch);
                self.link(branch, frag.entry);
                branch
            } else {
                frag.entry
            };

            match prev_branch {
                Some(prev) => self.link_fail(prev, start),
                None => entry = Some(start),
            }
            prev_branch = Some(start);
        }

        match entry {
            Some(entry) => Frag { entry, holes },
            None => self.single(TermKind::Void),
        }
    }

    /// Surrounds `body` with the given in and out terms.
    fn wrap(
        &mut self,
        kind_in: TermKind,
        body: &Ast,
        kind_out: TermKind,
    ) -> (TermId, TermId) {
        let term_in = self.term(kind_in);
        let frag = self.compile_ast(body);
        let term_out = self.term(kind_out);
        self.link(term_in, frag.entry);
        self.patch(&frag.holes, term_out);
        (term_in, term_out)
    }

    fn compile_group(&mut self, kind: GroupKind, body: &Ast) -> Frag {
        match kind {
            GroupKind::NonCapture => self.compile_ast(body),
            GroupKind::Capture(n) => {
                let (group_in, group_out) = self.wrap(
                    TermKind::GroupIn(n),
                    body,
                    TermKind::GroupOut(n),
                );
                Frag { entry: group_in, holes: vec![Hole::Next(group_out)] }
            }
            GroupKind::Atomic => {
                let la = self.new_lookaround();
                let (term_in, term_out) = self.wrap(
                    TermKind::IndependentIn(la),
                    body,
                    TermKind::IndependentOut(la),
                );
                Frag { entry: term_in, holes: vec![Hole::Next(term_out)] }
            }
            GroupKind::Lookahead { negative: false } => {
                let la = self.new_lookaround();
                let (term_in, term_out) = self.wrap(
                    TermKind::PLookaheadIn(la),
                    body,
                    TermKind::PLookaheadOut(la),
                );
                Frag { entry: term_in, holes: vec![Hole::Next(term_out)] }
            }
            GroupKind::Lookbehind { negative: false, width } => {
                let la = self.new_lookaround();
                let (term_in, term_out) = self.wrap(
                    TermKind::PLookbehindIn { la, distance: width },
                    body,
                    TermKind::PLookbehindOut(la),
                );
                Frag { entry: term_in, holes: vec![Hole::Next(term_out)] }
            }
            // In negative assertions reaching the out term means that the
            // body matched, so the out term always fails and has no
            // successor. The match continues through the `fail_next` of the
            // in term, which is pushed before entering the body.
            GroupKind::Lookahead { negative: true } => {
                let la = self.new_lookaround();
                let (term_in, _) = self.wrap(
                    TermKind::NLookaheadIn(la),
                    body,
                    TermKind::NLookaheadOut(la),
                );
                Frag { entry: term_in, holes: vec![Hole::Fail(term_in)] }
            }
            GroupKind::Lookbehind { negative: true, width } => {
                let la = self.new_lookaround();
                let (term_in, _) = self.wrap(
                    TermKind::NLookbehindIn { la, distance: width },
                    body,
                    TermKind::NLookbehindOut(la),
                );
                Frag { entry: term_in, holes: vec![Hole::Fail(term_in)] }
            }
        }
    }

    fn compile_conditional(&mut self, cond: &Conditional) -> Frag {
        let yes = self.compile_ast(&cond.yes);
        let no = cond.no.as_ref().map(|no| self.compile_ast(no));

        // `when_true` and `when_false` are the holes that lead to the yes
        // and no branches respectively.
        let (entry, when_true, when_false) = match &cond.condition {
            Condition::Captured(n) => {
                let term = self.term(TermKind::MemregCondition(*n));
                (term, Hole::Next(term), Hole::Fail(term))
            }
            Condition::Lookahead { negative, body } => {
                let la = self.new_lookaround();
                let (term_in, term_out) = self.wrap(
                    TermKind::LookaheadConditionIn(la),
                    body,
                    TermKind::LookaheadConditionOut(la),
                );
                if *negative {
                    (term_in, Hole::Fail(term_in), Hole::Next(term_out))
                } else {
                    (term_in, Hole::Next(term_out), Hole::Fail(term_in))
                }
            }
            Condition::Lookbehind { negative, width, body } => {
                let la = self.new_lookaround();
                let (term_in, term_out) = self.wrap(
                    TermKind::LookbehindConditionIn { la, distance: *width },
                    body,
                    TermKind::LookbehindConditionOut(la),
                );
                if *negative {
                    (term_in, Hole::Fail(term_in), Hole::Next(term_out))
                } else {
                    (term_in, Hole::Next(term_out), Hole::Fail(term_in))
                }
            }
        };

        self.patch(&[when_true], yes.entry);
        let mut holes = yes.holes;
        match no {
            Some(no) => {
                self.patch(&[when_false], no.entry);
                holes.extend(no.holes);
            }
            None => holes.push(when_false),
        }
        Frag { entry, holes }
    }

    fn compile_repetition(&mut self, rep: &Repetition) -> Frag {
        let Repetition { body, min, max, greedy } = rep;
        let (min, max, greedy) = (*min, *max, *greedy);

        match (min, max) {
            (_, Some(0)) => return self.single(TermKind::Void),
            (1, Some(1)) => return self.compile_ast(body),
            _ => {}
        }

        if greedy {
            if body.is_single_char() {
                return self.greedy_char(body, min, max);
            }
            if let Ast::BackRef { .. } = body {
                return self.greedy_reg(body, min, max);
            }
        }

        match (min, max) {
            (0, Some(1)) => self.optional(body, greedy),
            (0, None) => self.star(body, greedy),
            (1, None) => {
                let first = self.compile_ast(body);
                let rest = self.star(body, greedy);
                self.patch(&first.holes, rest.entry);
                Frag { entry: first.entry, holes: rest.holes }
            }
            _ if body.is_single_char() => self.lazy_char(body, min, max),
            _ => self.limits(body, min, max, greedy),
        }
    }

    /// Greedy repetition of a single character. The repetition term
    /// consumes as many characters as possible at once, and its
    /// `fail_next` is the backtrack term that gives them back one by one.
    fn greedy_char(&mut self, body: &Ast, min: u32, max: Option<u32>) -> Frag {
        let target = match Self::atom_kind(body) {
            Some(kind) => self.term(kind),
            None => return self.compile_ast(body),
        };
        let (repeat, backtrack) = match (min, max) {
            (0, None) => {
                (TermKind::Repeat0Inf { target }, TermKind::Backtrack0)
            }
            (min, None) => (
                TermKind::RepeatMinInf { target, min },
                TermKind::BacktrackMin { min },
            ),
            (min, Some(max)) => (
                TermKind::RepeatMinMax { target, min, max },
                TermKind::BacktrackMin { min },
            ),
        };
        self.repeat_and_backtrack(repeat, backtrack)
    }

    /// Greedy repetition of a back-reference.
    fn greedy_reg(&mut self, body: &Ast, min: u32, max: Option<u32>) -> Frag {
        let target = match Self::atom_kind(body) {
            Some(kind) => self.term(kind),
            None => return self.compile_ast(body),
        };
        let repeat = match max {
            None => TermKind::RepeatRegMinInf { target, min },
            Some(max) => TermKind::RepeatRegMinMax { target, min, max },
        };
        self.repeat_and_backtrack(repeat, TermKind::BacktrackRegMin { min })
    }

    fn repeat_and_backtrack(
        &mut self,
        repeat: TermKind,
        backtrack: TermKind,
    ) -> Frag {
        let repeat = self.term(repeat);
        let backtrack = self.term(backtrack);
        self.link_fail(repeat, backtrack);
        Frag {
            entry: repeat,
            holes: vec![Hole::Next(repeat), Hole::Next(backtrack)],
        }
    }

    /// Compiles the body of a loop. The returned fragment's holes go back
    /// to the loop head. If the body can match an empty string, the body is
    /// guarded by `POS_STORE` and `POS_CHECK` terms, and iterations that
    /// don't consume any character leave the loop through the returned
    /// escape holes instead of going back to the head.
    fn loop_body(&mut self, body: &Ast) -> (Frag, Vec<Hole>) {
        if body.min_width() > 0 {
            return (self.compile_ast(body), Vec::new());
        }
        let slot = self.new_counter();
        let store = self.term(TermKind::PosStore(slot));
        let frag = self.compile_ast(body);
        let check = self.term(TermKind::PosCheck(slot));
        self.link(store, frag.entry);
        self.patch(&frag.holes, check);
        (
            Frag { entry: store, holes: vec![Hole::Next(check)] },
            vec![Hole::Fail(check)],
        )
    }

    fn optional(&mut self, body: &Ast, greedy: bool) -> Frag {
        let branch = self.term(TermKind::Branch);
        let mut frag = self.compile_ast(body);
        if greedy {
            self.link(branch, frag.entry);
            frag.holes.push(Hole::Fail(branch));
        } else {
            self.link_fail(branch, frag.entry);
            frag.holes.push(Hole::Next(branch));
        }
        Frag { entry: branch, holes: frag.holes }
    }

    fn star(&mut self, body: &Ast, greedy: bool) -> Frag {
        let branch = self.term(TermKind::Branch);
        let (frag, mut holes) = self.loop_body(body);
        self.patch(&frag.holes, branch);
        if greedy {
            self.link(branch, frag.entry);
            holes.push(Hole::Fail(branch));
        } else {
            self.link_fail(branch, frag.entry);
            holes.push(Hole::Next(branch));
        }
        Frag { entry: branch, holes }
    }

    /// Lazy repetition of a single character with limits. The number of
    /// repetitions is kept in the matcher's counter register, which is
    /// saved in the backtracking entry pushed by `BRANCH_STORE_CNT` and
    /// read back by `READ_CNT_LT` when the matcher backtracks into it.
    fn lazy_char(&mut self, body: &Ast, min: u32, max: Option<u32>) -> Frag {
        let set = self.term(TermKind::CntSet0);
        let branch = self.term(TermKind::BranchStoreCnt);
        let read = self.term(TermKind::ReadCntLt(max));
        let atom = self.compile_ast(body);
        let inc = self.term(TermKind::CntInc);

        let head = if min > 0 {
            let check = self.term(TermKind::CntGtEq(min));
            self.link(check, branch);
            self.link_fail(check, atom.entry);
            check
        } else {
            branch
        };

        self.link(set, head);
        self.link_fail(branch, read);
        self.link(read, atom.entry);
        self.patch(&atom.holes, inc);
        self.link(inc, head);

        Frag { entry: set, holes: vec![Hole::Next(branch)] }
    }

    /// General repetition with limits, which uses a loop counter.
    fn limits(
        &mut self,
        body: &Ast,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Frag {
        let cr = self.new_counter();
        let set = self.term(TermKind::CrSet0(cr));
        let branch = self.term(TermKind::Branch);
        let inc = self.term(TermKind::CrStoreCrInc(cr));
        let (frag, escapes) = self.loop_body(body);
        let lt = max.map(|max| self.term(TermKind::CrLt(cr, max)));
        let gt_eq = (min > 0).then(|| self.term(TermKind::CrGtEq(cr, min)));

        self.link(inc, frag.entry);
        let mut holes = escapes;

        if greedy {
            // CR_SET_0 -> BRANCH -> CRSTORE_CRINC -> body -> CR_LT -> BRANCH
            // The alternative of BRANCH, and CR_LT when the maximum is
            // reached, lead to CR_GT_EQ, which exits the loop.
            self.link(set, branch);
            self.link(branch, inc);
            let mut exits = vec![Hole::Fail(branch)];
            match lt {
                Some(lt) => {
                    self.patch(&frag.holes, lt);
                    self.link(lt, branch);
                    exits.push(Hole::Fail(lt));
                }
                None => self.patch(&frag.holes, branch),
            }
            match gt_eq {
                Some(gt_eq) => {
                    self.patch(&exits, gt_eq);
                    holes.push(Hole::Next(gt_eq));
                }
                None => holes.extend(exits),
            }
        } else {
            // CR_SET_0 -> CR_GT_EQ -> BRANCH -> exit
            // The alternative of BRANCH is CR_LT -> CRSTORE_CRINC -> body,
            // which goes back to CR_GT_EQ. While the minimum is not reached
            // CR_GT_EQ goes straight to CRSTORE_CRINC.
            let head = match gt_eq {
                Some(gt_eq) => {
                    self.link(gt_eq, branch);
                    self.link_fail(gt_eq, inc);
                    gt_eq
                }
                None => branch,
            };
            self.link(set, head);
            self.patch(&frag.holes, head);
            match lt {
                Some(lt) => {
                    self.link_fail(branch, lt);
                    self.link(lt, inc);
                }
                None => self.link_fail(branch, inc),
            }
            holes.push(Hole::Next(branch));
        }

        Frag { entry: set, holes }
    }
}
