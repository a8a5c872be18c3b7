/*! Abstract syntax tree produced by the pattern parser.

Flags have already been applied when the tree is built: case-insensitive
literals are classes containing every case variant, `.` knows whether it
matches line terminators, and `^`/`$` know whether they are line anchors.
Group names are resolved into group numbers.
*/

use crate::re::blockset::CodePointSet;
use crate::re::GroupMode;

#[derive(Debug)]
pub(crate) enum Ast {
    Empty,
    Literal(char),
    Class(Box<CodePointSet>),
    Any { dot_all: bool },
    Assertion(Assertion),
    /// `\b` and `\B`.
    Boundary { word: Box<CodePointSet>, negated: bool },
    /// `\<` and `\>`.
    Direction { word: Box<CodePointSet>, end: bool },
    BackRef { group: usize, mode: GroupMode },
    Concat(Vec<Ast>),
    Alternation(Vec<Ast>),
    Group(Box<Group>),
    Conditional(Box<Conditional>),
    Repetition(Box<Repetition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assertion {
    /// `\A`, and `^` without the multiline flag.
    Start,
    /// `\z`
    End,
    /// `\Z`, and `$` without the multiline flag.
    EndOfLine,
    /// `^` with the multiline flag.
    LineStart,
    /// `$` with the multiline flag.
    LineEnd,
    /// `\G`
    LastMatchEnd,
}

#[derive(Debug)]
pub(crate) struct Group {
    pub kind: GroupKind,
    pub body: Ast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupKind {
    Capture(usize),
    NonCapture,
    Lookahead { negative: bool },
    /// `width` is the number of characters matched by the body, which must
    /// be fixed.
    Lookbehind { negative: bool, width: usize },
    Atomic,
}

#[derive(Debug)]
pub(crate) struct Conditional {
    pub condition: Condition,
    pub yes: Ast,
    pub no: Option<Ast>,
}

#[derive(Debug)]
pub(crate) enum Condition {
    /// The group with the given number was captured.
    Captured(usize),
    Lookahead { negative: bool, body: Ast },
    Lookbehind { negative: bool, width: usize, body: Ast },
}

#[derive(Debug)]
pub(crate) struct Repetition {
    pub body: Ast,
    pub min: u32,
    pub max: Option<u32>,
    pub greedy: bool,
}

impl Ast {
    /// True for the expressions that always match exactly one character.
    pub fn is_single_char(&self) -> bool {
        matches!(self, Ast::Literal(_) | Ast::Class(_) | Ast::Any { .. })
    }

    /// Minimum number of characters matched by the expression.
    ///
    /// Back-references are assumed to be able to match the empty string.
    pub fn min_width(&self) -> usize {
        match self {
            Ast::Literal(_) | Ast::Class(_) | Ast::Any { .. } => 1,
            Ast::Empty
            | Ast::Assertion(_)
            | Ast::Boundary { .. }
            | Ast::Direction { .. }
            | Ast::BackRef { .. } => 0,
            Ast::Concat(items) => items.iter().map(Ast::min_width).sum(),
            Ast::Alternation(alts) => {
                alts.iter().map(Ast::min_width).min().unwrap_or(0)
            }
            Ast::Group(group) => match group.kind {
                GroupKind::Capture(_)
                | GroupKind::NonCapture
                | GroupKind::Atomic => group.body.min_width(),
                GroupKind::Lookahead { .. }
                | GroupKind::Lookbehind { .. } => 0,
            },
            Ast::Conditional(cond) => cond.yes.min_width().min(
                cond.no.as_ref().map(Ast::min_width).unwrap_or(0),
            ),
            Ast::Repetition(rep) => rep.body.min_width() * rep.min as usize,
        }
    }

    /// Number of characters matched by the expression, which must be the
    /// same for every possible match. Used for lookbehind assertions, which
    /// are evaluated by stepping back that many characters.
    pub fn fixed_width(&self) -> Result<usize, &'static str> {
        const VARIABLE: &str =
            "variable length element within a lookbehind assertion";

        match self {
            Ast::Literal(_) | Ast::Class(_) | Ast::Any { .. } => Ok(1),
            Ast::Empty
            | Ast::Assertion(_)
            | Ast::Boundary { .. }
            | Ast::Direction { .. } => Ok(0),
            Ast::BackRef { .. } | Ast::Conditional(_) => Err(VARIABLE),
            Ast::Concat(items) => items
                .iter()
                .try_fold(0, |acc, item| Ok(acc + item.fixed_width()?)),
            Ast::Alternation(alts) => {
                let mut width = None;
                for alt in alts {
                    let w = alt.fixed_width()?;
                    match width {
                        Some(prev) if prev != w => {
                            return Err("non-equal branch lengths within a \
                                        lookbehind assertion")
                        }
                        _ => width = Some(w),
                    }
                }
                Ok(width.unwrap_or(0))
            }
            Ast::Group(group) => match group.kind {
                GroupKind::Capture(_)
                | GroupKind::NonCapture
                | GroupKind::Atomic => group.body.fixed_width(),
                GroupKind::Lookahead { .. } | GroupKind::Lookbehind { .. } => {
                    Ok(0)
                }
            },
            Ast::Repetition(rep) => match rep.max {
                Some(max) if max == rep.min => {
                    Ok(rep.body.fixed_width()? * max as usize)
                }
                _ => Err(VARIABLE),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Ast, Group, GroupKind, Repetition};

    fn concat(s: &str) -> Ast {
        Ast::Concat(s.chars().map(Ast::Literal).collect())
    }

    #[test]
    fn widths() {
        let alt = Ast::Alternation(vec![concat("ab"), concat("cd")]);
        assert_eq!(alt.fixed_width(), Ok(2));
        assert_eq!(alt.min_width(), 2);

        let alt = Ast::Alternation(vec![concat("ab"), concat("cde")]);
        assert_eq!(
            alt.fixed_width(),
            Err("non-equal branch lengths within a lookbehind assertion")
        );
        assert_eq!(alt.min_width(), 2);

        let group = Ast::Group(Box::new(Group {
            kind: GroupKind::NonCapture,
            body: concat("xyz"),
        }));
        assert_eq!(group.fixed_width(), Ok(3));

        let rep = Ast::Repetition(Box::new(Repetition {
            body: concat("ab"),
            min: 0,
            max: None,
            greedy: true,
        }));
        assert_eq!(rep.min_width(), 0);
        assert!(rep.fixed_width().is_err());

        let rep = Ast::Repetition(Box::new(Repetition {
            body: concat("ab"),
            min: 3,
            max: Some(3),
            greedy: false,
        }));
        assert_eq!(rep.fixed_width(), Ok(6));
    }
}
