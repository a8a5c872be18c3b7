/*! Rewrites a compiled [`Program`] so that it runs faster.

The optimizer looks for a term that matches a "rare" character and that
every match must contain at a fixed distance from its start. A character is
considered rare if it is a single character, a back-reference, or a class
that doesn't have more than `threshold` members. When such a term exists, a
`FIND` term is added as the entry point of unanchored searches. `FIND`
scans the input for the rare character, skipping all the positions where a
match can't start.

The same idea is applied to greedy repetitions of single characters, like
`.*` in `.*foo`. When backtracking, instead of giving back characters one by
one and trying the rest of the pattern after each of them, the repetition
gives back characters until the one that follows it is found.
*/

#[cfg(feature = "logging")]
use log::*;

use crate::re::program::{Program, TermId, TermKind};

/// Default value for the maximum number of members that a class can have
/// for being used as a scanning target.
pub(crate) const DEFAULT_SCAN_THRESHOLD: u32 = 20;

pub(crate) fn optimize(mut program: Program, threshold: u32) -> Program {
    for index in 0..program.terms.len() {
        let term = &program.terms[index];
        let is_repeat = matches!(
            term.kind,
            TermKind::Repeat0Inf { .. }
                | TermKind::RepeatMinInf { .. }
                | TermKind::RepeatMinMax { .. }
        );
        match term.fail_next {
            Some(back) if is_repeat => {
                make_backtrack(&mut program, back, threshold);
            }
            _ => {}
        }
    }

    if let Some(root) = make_first(&mut program, threshold) {
        #[cfg(feature = "logging")]
        debug!("optimizer: scanning for {}", program[root].kind);
        program.root = root;
    }

    program
}

/// Looks for a term that can be used as the target of a scan, starting at
/// term `id`, which is `distance` characters away from the point where the
/// scan starts. Returns the target and its distance.
///
/// A back-reference is a valid target only if `with_reg` is true and no
/// group boundary lies between the scan and the back-reference. Otherwise
/// the group may not be captured yet when the scan runs.
fn find_target(
    program: &Program,
    id: TermId,
    distance: usize,
    threshold: u32,
    with_reg: bool,
) -> Option<(TermId, usize)> {
    let term = &program[id];
    match &term.kind {
        TermKind::Char(_) => Some((id, distance)),
        TermKind::Reg { .. } if with_reg => Some((id, distance)),
        TermKind::Class(set) if set.weight() <= threshold => {
            Some((id, distance))
        }
        TermKind::Class(_) | TermKind::AnyChar | TermKind::AnyCharNe => {
            let next = term.next?;
            find_target(program, next, distance + 1, threshold, with_reg)
        }
        // A repetition with a minimum greater than zero starts with at
        // least one occurrence of its target.
        TermKind::RepeatMinInf { target, min }
        | TermKind::RepeatMinMax { target, min, .. }
            if *min > 0 =>
        {
            match &program[*target].kind {
                TermKind::Char(_) => Some((*target, distance)),
                TermKind::Class(set) if set.weight() <= threshold => {
                    Some((*target, distance))
                }
                _ => None,
            }
        }
        TermKind::GroupIn(_) | TermKind::GroupOut(_)
            if term.fail_next.is_none() =>
        {
            find_target(program, term.next?, distance, threshold, false)
        }
        kind if is_transparent(kind) && term.fail_next.is_none() => {
            find_target(program, term.next?, distance, threshold, with_reg)
        }
        _ => None,
    }
}

/// Terms that don't consume characters and always continue with `next` if
/// they succeed. Conditions are transparent only when they don't have an
/// alternative path, which is checked by the caller.
fn is_transparent(kind: &TermKind) -> bool {
    matches!(
        kind,
        TermKind::Start
            | TermKind::End
            | TermKind::EndEol
            | TermKind::LineStart
            | TermKind::LineEnd
            | TermKind::LastMatchEnd
            | TermKind::Boundary { .. }
            | TermKind::Direction { .. }
            | TermKind::Void
            | TermKind::CntSet0
            | TermKind::CntInc
            | TermKind::CntGtEq(_)
            | TermKind::CrSet0(_)
            | TermKind::CrStoreCrInc(_)
            | TermKind::CrLt(..)
            | TermKind::CrGtEq(..)
            | TermKind::PosStore(_)
    )
}

/// Adds a `FIND` term in front of the program's entry point, if possible.
/// Back-references are never scanned for here, as no group is captured at
/// the entry point.
fn make_first(program: &mut Program, threshold: u32) -> Option<TermId> {
    let first = program.root0;
    let (target, distance) =
        find_target(program, first, 0, threshold, false)?;

    let eat = target == first;
    let next = if eat { program[target].next? } else { first };

    let find = program.push(TermKind::Find { target, distance, eat });
    program[find].next = Some(next);
    Some(find)
}

/// Replaces the backtrack term of a greedy repetition with one that gives
/// back characters until the target found after the repetition appears.
fn make_backtrack(program: &mut Program, back: TermId, threshold: u32) {
    let min = match program[back].kind {
        TermKind::Backtrack0 => 0,
        TermKind::BacktrackMin { min } => min,
        _ => return,
    };
    let Some(next) = program[back].next else {
        return;
    };
    let Some((target, distance)) =
        find_target(program, next, 0, threshold, true)
    else {
        return;
    };

    let eat = target == next;
    if eat {
        match program[target].next {
            Some(after) => program[back].next = Some(after),
            None => return,
        }
    }

    program[back].kind = if let TermKind::Reg { .. } = program[target].kind {
        TermKind::BacktrackFindRegMin { target, min, distance, eat }
    } else {
        TermKind::BacktrackFindMin { target, min, distance, eat }
    };

    #[cfg(feature = "logging")]
    debug!("optimizer: {} rewritten as {}", back, program[back].kind);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{optimize, DEFAULT_SCAN_THRESHOLD};
    use crate::re::compiler::Compiler;
    use crate::re::parser::Parser;

    macro_rules! assert_optimized_code {
        ($re:expr, $code:expr) => {{
            let parsed = Parser::new().parse($re).unwrap();
            let program = optimize(
                Compiler::new().compile(parsed),
                DEFAULT_SCAN_THRESHOLD,
            );
            assert_eq!($code, program.to_string());
        }};
    }

    #[test]
    fn find() {
        assert_optimized_code!(
            ".b",
            r#"
00000: ANY_CHAR_NE -> 00001
00001: CHAR 'b' -> 00002
00002: SUCCESS
00003: FIND 00001 distance=1 -> 00000 <root>
"#
        );

        assert_optimized_code!(
            r"(\d+)x",
            r#"
00000: GROUP_IN 1 -> 00002
00001: (BITSET [0-9])
00002: REPEAT_MIN_INF 00001 min=1 -> 00004 | 00003
00003: BACKTRACK_FIND_MIN 00005 min=1 distance=0 -> 00004
00004: GROUP_OUT 1 -> 00005
00005: CHAR 'x' -> 00006
00006: SUCCESS
00007: FIND 00001 distance=0 -> 00000 <root>
"#
        );
    }

    #[test]
    fn backtrack() {
        assert_optimized_code!(
            "x.*y",
            r#"
00000: CHAR 'x' -> 00002
00001: (ANY_CHAR_NE)
00002: REPEAT_0_INF 00001 -> 00004 | 00003
00003: BACKTRACK_FIND_MIN 00004 min=0 distance=0 eat -> 00005
00004: CHAR 'y' -> 00005
00005: SUCCESS
00006: FIND 00000 distance=0 eat -> 00002 <root>
"#
        );
    }

    #[test]
    fn no_target() {
        // Alternatives are not scanned for.
        assert_optimized_code!(
            "a|b",
            r#"
00000: CHAR 'a' -> 00003
00001: BRANCH -> 00000 | 00002
00002: CHAR 'b' -> 00003
00003: SUCCESS
"#
        );

        // Large classes are skipped.
        assert_optimized_code!(
            r"\w",
            r#"
00000: BITSET [0-9A-Z_a-z] -> 00001
00001: SUCCESS
"#
        );
    }
}
