use pretty_assertions::assert_eq;

use super::{ParsedPattern, Parser};
use crate::errors::SyntaxError;
use crate::re::ast::{Assertion, Ast, Condition, GroupKind};
use crate::re::{Flags, GroupMode};

fn parse(pattern: &str) -> ParsedPattern {
    Parser::new().parse(pattern).unwrap()
}

fn parse_with(pattern: &str, flags: Flags) -> ParsedPattern {
    Parser::new().flags(flags).parse(pattern).unwrap()
}

fn error(pattern: &str) -> SyntaxError {
    Parser::new().parse(pattern).unwrap_err()
}

macro_rules! assert_error {
    ($pattern:expr, $message:expr, $offset:expr) => {{
        let err = error($pattern);
        assert_eq!((err.message(), err.offset()), ($message, $offset));
    }};
}

#[test]
fn literals_and_concat() {
    match parse("abc").ast {
        Ast::Concat(items) => {
            assert_eq!(items.len(), 3);
            assert!(matches!(items[0], Ast::Literal('a')));
            assert!(matches!(items[2], Ast::Literal('c')));
        }
        ast => panic!("unexpected {:?}", ast),
    }
    assert!(matches!(parse("").ast, Ast::Empty));
    assert!(matches!(parse("x").ast, Ast::Literal('x')));
    assert!(matches!(parse(r"\x41").ast, Ast::Literal('A')));
    assert!(matches!(parse(r"\x{1F600}").ast, Ast::Literal('\u{1F600}')));
    assert!(matches!(parse(r"é").ast, Ast::Literal('é')));
    assert!(matches!(parse(r"\012").ast, Ast::Literal('\n')));
    assert!(matches!(parse(r"\cA").ast, Ast::Literal('\x01')));
    assert!(matches!(parse(r"\.").ast, Ast::Literal('.')));
}

#[test]
fn quoted() {
    match parse(r"\Qa.b\E*").ast {
        Ast::Concat(items) => {
            assert_eq!(items.len(), 3);
            assert!(matches!(items[1], Ast::Literal('.')));
            // The quantifier applies to the last quoted character.
            assert!(matches!(items[2], Ast::Repetition(_)));
        }
        ast => panic!("unexpected {:?}", ast),
    }
}

#[test]
fn quantifiers() {
    let rep = |pattern: &str| match parse(pattern).ast {
        Ast::Repetition(rep) => (rep.min, rep.max, rep.greedy),
        ast => panic!("unexpected {:?}", ast),
    };
    assert_eq!(rep("a*"), (0, None, true));
    assert_eq!(rep("a+?"), (1, None, false));
    assert_eq!(rep("a?"), (0, Some(1), true));
    assert_eq!(rep("a{3}"), (3, Some(3), true));
    assert_eq!(rep("a{2,}"), (2, None, true));
    assert_eq!(rep("a{,4}?"), (0, Some(4), false));
    assert_eq!(rep("a{ 2 , 5 }"), (2, Some(5), true));

    // A brace that doesn't start a quantifier is a literal.
    match parse("a{b").ast {
        Ast::Concat(items) => assert!(matches!(items[1], Ast::Literal('{'))),
        ast => panic!("unexpected {:?}", ast),
    }
}

#[test]
fn quantifier_errors() {
    assert_error!("*a", "missing term before *", 0);
    assert_error!("a**", "missing term before *", 2);
    assert_error!("(?:+)", "missing term before +", 3);
    assert_error!("a{5,2}", "malformed quantifier", 1);
    assert_error!("a{2", "malformed quantifier", 1);
    assert_error!("a{1,2,3}", "malformed quantifier", 1);
}

#[test]
fn groups() {
    let parsed = parse("(a)(?:b)(?<year>c)(d)");
    assert_eq!(parsed.group_count, 4);
    assert_eq!(parsed.names.get("year"), Some(&2));

    let parsed = parse("({name}a)({=name}b)({7}c)");
    assert_eq!(parsed.names.get("name"), Some(&1));
    assert_eq!(parsed.group_count, 8);

    assert!(matches!(
        parse("(?>a)").ast,
        Ast::Group(ref g) if g.kind == GroupKind::Atomic
    ));
    assert!(matches!(
        parse("(?!a)").ast,
        Ast::Group(ref g) if g.kind == GroupKind::Lookahead { negative: true }
    ));
    assert!(matches!(parse("(?#comment)").ast, Ast::Empty));
}

#[test]
fn group_errors() {
    assert_error!("(a", "unbalanced parenthesis", 0);
    assert_error!("a)", "unbalanced parenthesis", 1);
    assert_error!("(?#abc", "unterminated comment", 0);
    assert_error!("(?Qa)", "wrong char after (?", 0);
    assert_error!("(?<n>a)(?<n>b)", "group redeclaration: n", 7);
    assert_error!("({n}a)({n}b)", "group redeclaration: n", 6);
    assert_error!("(?<1a>x)", "group name must not start with a digit: 1a", 0);
    assert_error!(r"\k<nope>", "backreference to unknown group: nope", 0);
    assert_error!(
        "(?(1)a|b|c)",
        "conditional expression with more than two branches",
        0
    );
}

#[test]
fn lookbehind() {
    match parse("(?<=ab|cd)x").ast {
        Ast::Concat(items) => match &items[0] {
            Ast::Group(g) => assert_eq!(
                g.kind,
                GroupKind::Lookbehind { negative: false, width: 2 }
            ),
            ast => panic!("unexpected {:?}", ast),
        },
        ast => panic!("unexpected {:?}", ast),
    }
    assert_error!(
        "(?<=(?:ab|cde))x",
        "non-equal branch lengths within a lookbehind assertion",
        0
    );
    assert_error!(
        "x(?<!a+)",
        "variable length element within a lookbehind assertion",
        1
    );
}

#[test]
fn back_references() {
    let parsed = parse(r"(a)(?<b>x)\1\k<b>{\@/b}");
    match parsed.ast {
        Ast::Concat(items) => {
            assert!(matches!(
                items[2],
                Ast::BackRef { group: 1, mode } if mode.is_empty()
            ));
            assert!(matches!(items[3], Ast::BackRef { group: 2, .. }));
            assert!(matches!(
                items[4],
                Ast::BackRef { group: 2, mode }
                    if mode == GroupMode::IGNORE_CASE | GroupMode::REVERSE
            ));
        }
        ast => panic!("unexpected {:?}", ast),
    }

    match parse_with(r"(a)\1", Flags::IGNORE_CASE).ast {
        Ast::Concat(items) => assert!(matches!(
            items[1],
            Ast::BackRef { group: 1, mode } if mode == GroupMode::IGNORE_CASE
        )),
        ast => panic!("unexpected {:?}", ast),
    }
}

#[test]
fn conditionals() {
    match parse("(a)?(?(1)b|c)").ast {
        Ast::Concat(items) => match &items[1] {
            Ast::Conditional(cond) => {
                assert!(matches!(cond.condition, Condition::Captured(1)));
                assert!(matches!(cond.yes, Ast::Literal('b')));
                assert!(matches!(cond.no, Some(Ast::Literal('c'))));
            }
            ast => panic!("unexpected {:?}", ast),
        },
        ast => panic!("unexpected {:?}", ast),
    }
    match parse("(?(?<=a)b)").ast {
        Ast::Conditional(cond) => {
            assert!(matches!(
                cond.condition,
                Condition::Lookbehind { negative: false, width: 1, .. }
            ));
            assert!(cond.no.is_none());
        }
        ast => panic!("unexpected {:?}", ast),
    }
}

#[test]
fn inline_flags() {
    // `(?i)` lasts until the end of the enclosing group.
    match parse("((?i)a)a").ast {
        Ast::Concat(items) => {
            match &items[0] {
                Ast::Group(g) => assert!(matches!(g.body, Ast::Class(_))),
                ast => panic!("unexpected {:?}", ast),
            }
            assert!(matches!(items[1], Ast::Literal('a')));
        }
        ast => panic!("unexpected {:?}", ast),
    }
    assert!(matches!(parse("(?s).").ast, Ast::Any { dot_all: true }));
    assert!(matches!(parse(".").ast, Ast::Any { dot_all: false }));
    assert!(matches!(
        parse("(?m)^").ast,
        Ast::Assertion(Assertion::LineStart)
    ));
    assert!(matches!(
        parse_with("(?-m)$", Flags::MULTILINE).ast,
        Ast::Assertion(Assertion::EndOfLine)
    ));
    match parse("(?x: a b )").ast {
        Ast::Group(g) => {
            assert!(matches!(&g.body, Ast::Concat(v) if v.len() == 2))
        }
        ast => panic!("unexpected {:?}", ast),
    }
}

fn class(pattern: &str, flags: Flags) -> crate::re::blockset::CodePointSet {
    match parse_with(pattern, flags).ast {
        Ast::Class(set) => *set,
        ast => panic!("unexpected {:?}", ast),
    }
}

#[test]
fn classes() {
    let set = class("[a-cx]", Flags::empty());
    assert_eq!(set.ranges(), vec![('a', 'c'), ('x', 'x')]);

    let set = class("[]a-]", Flags::empty());
    assert_eq!(set.ranges(), vec![('-', '-'), (']', ']'), ('a', 'a')]);

    let set = class("[^0-9]", Flags::empty());
    assert!(!set.contains('5'));
    assert!(set.contains('a'));

    let set = class("[a-z&&[^aeiou]]", Flags::empty());
    assert!(set.contains('b'));
    assert!(!set.contains('e'));
    assert!(!set.contains('B'));

    let set = class("[a-z-[aeiou]]", Flags::XML_SCHEMA);
    assert!(set.contains('b'));
    assert!(!set.contains('e'));

    let set = class("[[:digit:]x]", Flags::empty());
    assert_eq!(set.ranges(), vec![('0', '9'), ('x', 'x')]);

    let set = class(r"[\d\p{Lu}]", Flags::empty());
    assert!(set.contains('7'));
    assert!(set.contains('Q'));
    assert!(!set.contains('q'));

    let set = class("[k-m]", Flags::IGNORE_CASE);
    assert!(set.contains('L'));

    let set = class("(?[[a-z]-[m-z]+[0]])", Flags::empty());
    assert_eq!(set.ranges(), vec![('0', '0'), ('a', 'l')]);

    // A negated first operand is combined by its members, not by the
    // members it excludes.
    let set = class("(?[^a-z]+[0-9])", Flags::empty());
    assert!(set.is_positive());
    assert!(set.contains('5'));
    assert!(set.contains('X'));
    assert!(!set.contains('q'));

    let set = class("(?[^a-z]&[a-f0-9])", Flags::empty());
    assert_eq!(set.ranges(), vec![('0', '9')]);

    let set = class(r"\p{Greek}", Flags::empty());
    assert!(set.contains('λ'));

    let set = class("{Lu}", Flags::empty());
    assert!(set.contains('Ж'));

    // Case-insensitive literals become classes.
    let set = class("a", Flags::IGNORE_CASE);
    assert_eq!(set.ranges(), vec![('A', 'A'), ('a', 'a')]);
}

#[test]
fn class_errors() {
    assert_error!("[abc", "malformed character class", 0);
    assert_error!("[z-a]", "illegal character range", 1);
    assert_error!("[[:nope:]]", "unknown POSIX class: nope", 1);
    assert_error!(r"\p{Nope}", "unknown character category: Nope", 0);
    assert_error!(r"\q", "unknown escape sequence \\q", 0);
    assert_error!("a\\", "escape without a character", 1);
    assert_error!("(?[[a]*[b]])", "malformed class group", 0);
}
