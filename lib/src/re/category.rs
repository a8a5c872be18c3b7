/*! Predefined character sets.

This module builds the sets behind `\w`, `\d`, `\s`, `\h`, `\v`, the POSIX
classes like `[:alpha:]`, and the Unicode properties like `\p{Lu}` or
`\p{Greek}`. Unicode data is obtained from [`regex_syntax`], which already
ships the tables for general categories, scripts and binary properties.
Everything is clipped to the range covered by [`CodePointSet`].
*/

use lazy_static::lazy_static;
use regex_syntax::hir::{Class, HirKind};
use regex_syntax::ParserBuilder;

use crate::re::blockset::CodePointSet;

lazy_static! {
    static ref UNICODE_WORD: CodePointSet = unicode_set(r"\w");
    static ref UNICODE_DIGIT: CodePointSet = unicode_set(r"\p{Nd}");
    static ref UNICODE_SPACE: CodePointSet = unicode_set(r"\s");
    static ref UNICODE_HSPACE: CodePointSet = unicode_set(r"[\t\p{Zs}]");
}

/// Builds a set from a `regex-syntax` class expression that is known to be
/// valid.
fn unicode_set(class: &str) -> CodePointSet {
    parse_class(class).unwrap_or_default()
}

/// Parses a class expression with `regex-syntax` and returns its members.
/// Returns `None` if the expression is not valid.
fn parse_class(class: &str) -> Option<CodePointSet> {
    let hir = ParserBuilder::new().unicode(true).build().parse(class).ok()?;
    match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => Some(
            CodePointSet::from_ranges(
                class.ranges().iter().map(|r| (r.start(), r.end())),
            ),
        ),
        // Classes with a single member are reported as literals.
        HirKind::Literal(lit) => {
            let mut set = CodePointSet::new();
            for c in std::str::from_utf8(&lit.0).ok()?.chars() {
                set.insert(c);
            }
            Some(set)
        }
        _ => None,
    }
}

/// Word characters. The ASCII form is `[a-zA-Z0-9_]`.
pub(crate) fn word(unicode: bool) -> CodePointSet {
    if unicode {
        UNICODE_WORD.clone()
    } else {
        CodePointSet::from_ranges([
            ('a', 'z'),
            ('A', 'Z'),
            ('0', '9'),
            ('_', '_'),
        ])
    }
}

/// Decimal digits.
pub(crate) fn digit(unicode: bool) -> CodePointSet {
    if unicode {
        UNICODE_DIGIT.clone()
    } else {
        CodePointSet::from_ranges([('0', '9')])
    }
}

/// White space. The ASCII form is space, `\r`, `\n`, `\t` and `\f`.
pub(crate) fn space(unicode: bool) -> CodePointSet {
    if unicode {
        UNICODE_SPACE.clone()
    } else {
        CodePointSet::from_ranges(" \r\n\t\x0C".chars().map(|c| (c, c)))
    }
}

/// Horizontal space.
pub(crate) fn horizontal_space(unicode: bool) -> CodePointSet {
    if unicode {
        UNICODE_HSPACE.clone()
    } else {
        CodePointSet::from_ranges([(' ', ' '), ('\t', '\t')])
    }
}

/// Vertical space.
pub(crate) fn vertical_space(unicode: bool) -> CodePointSet {
    let mut set = CodePointSet::from_ranges([('\n', '\r')]);
    if unicode {
        for c in ['\u{85}', '\u{2028}', '\u{2029}'] {
            set.insert(c);
        }
    }
    set
}

/// Returns the set for a Unicode property name, as used in `\p{Name}`.
///
/// Accepts general categories (`L`, `Lu`, `Letter`...), scripts (`Greek`,
/// `Cyrillic`...) and binary properties (`Alphabetic`, `White_Space`...).
/// Returns `None` if the name is unknown.
pub(crate) fn unicode_property(name: &str) -> Option<CodePointSet> {
    if name.is_empty()
        || !name.chars().all(|c| c.is_alphanumeric() || "_- =".contains(c))
    {
        return None;
    }
    parse_class(&format!(r"\p{{{}}}", name))
}

/// Returns the set for a POSIX class name, as used in `[[:name:]]`.
pub(crate) fn posix_class(name: &str) -> Option<CodePointSet> {
    if !name.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }
    parse_class(&format!("[[:{}:]]", name))
}

/// Case folding used by case-insensitive comparisons.
#[inline]
pub(crate) fn fold(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Returns the characters that are equal to `c` when case is ignored,
/// including `c` itself.
pub(crate) fn case_variants(c: char) -> impl Iterator<Item = char> {
    let lower = single(c.to_lowercase());
    let upper = single(c.to_uppercase());
    std::iter::once(c)
        .chain(lower)
        .chain(upper)
        .chain(upper.and_then(|u| single(u.to_lowercase())))
}

/// Returns the only character produced by `it`, or `None` if it produces
/// zero or more than one.
fn single<I: Iterator<Item = char>>(mut it: I) -> Option<char> {
    let first = it.next()?;
    it.next().is_none().then_some(first)
}

/// Adds to `set` the case variants of all its members.
pub(crate) fn add_case_variants(set: &mut CodePointSet) {
    let variants: Vec<char> = set
        .members()
        .flat_map(case_variants)
        .filter(|c| !set.has_member(*c as u32))
        .collect();
    for c in variants {
        set.insert(c);
    }
}

const BRACKETS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('\u{ab}', '\u{bb}'),
    ('\u{2039}', '\u{203a}'),
    ('\u{2045}', '\u{2046}'),
    ('\u{207d}', '\u{207e}'),
    ('\u{208d}', '\u{208e}'),
    ('\u{2329}', '\u{232a}'),
    ('\u{27e6}', '\u{27e7}'),
    ('\u{27e8}', '\u{27e9}'),
    ('\u{27ea}', '\u{27eb}'),
    ('\u{2983}', '\u{2984}'),
    ('\u{2985}', '\u{2986}'),
    ('\u{3008}', '\u{3009}'),
    ('\u{300a}', '\u{300b}'),
    ('\u{300c}', '\u{300d}'),
    ('\u{300e}', '\u{300f}'),
    ('\u{3010}', '\u{3011}'),
    ('\u{3014}', '\u{3015}'),
    ('\u{3016}', '\u{3017}'),
    ('\u{3018}', '\u{3019}'),
    ('\u{301a}', '\u{301b}'),
    ('\u{ff08}', '\u{ff09}'),
    ('\u{ff3b}', '\u{ff3d}'),
    ('\u{ff5b}', '\u{ff5d}'),
];

/// Maps an opening bracket to the closing one and vice versa. Any other
/// character is returned unchanged.
pub(crate) fn mirror_bracket(c: char) -> char {
    for (open, close) in BRACKETS {
        if c == *open {
            return *close;
        }
        if c == *close {
            return *open;
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn perl_classes() {
        assert!(word(false).contains('_'));
        assert!(!word(false).contains('é'));
        assert!(word(true).contains('é'));
        assert!(word(true).contains('Ж'));
        assert!(digit(true).contains('\u{0663}'));
        assert!(!digit(false).contains('\u{0663}'));
        assert!(space(false).contains('\x0C'));
        assert!(space(true).contains('\u{2003}'));
        assert!(horizontal_space(true).contains('\u{a0}'));
        assert!(!horizontal_space(true).contains('\n'));
        assert!(vertical_space(true).contains('\u{2028}'));
        assert!(!vertical_space(false).contains('\u{2028}'));
    }

    #[test]
    fn properties() {
        let lu = unicode_property("Lu").unwrap();
        assert!(lu.contains('A'));
        assert!(lu.contains('Ж'));
        assert!(!lu.contains('a'));

        let greek = unicode_property("Greek").unwrap();
        assert!(greek.contains('λ'));
        assert!(!greek.contains('l'));

        // A category with a single member.
        let zl = unicode_property("Zl").unwrap();
        assert!(zl.contains('\u{2028}'));
        assert_eq!(zl.weight(), 1);

        assert!(unicode_property("NotAProperty").is_none());
        assert!(unicode_property("L}|x").is_none());
    }

    #[test]
    fn posix() {
        let alpha = posix_class("alpha").unwrap();
        assert!(alpha.contains('q'));
        assert!(!alpha.contains('é'));
        assert!(posix_class("nope").is_none());
    }

    #[test]
    fn case() {
        assert_eq!(fold('A'), 'a');
        assert_eq!(fold('Ж'), 'ж');
        assert_eq!(fold('1'), '1');

        let mut set = CodePointSet::from_ranges([('a', 'c')]);
        add_case_variants(&mut set);
        assert_eq!(set.ranges(), vec![('A', 'C'), ('a', 'c')]);
    }

    #[test]
    fn brackets() {
        assert_eq!(mirror_bracket('('), ')');
        assert_eq!(mirror_bracket(']'), '[');
        assert_eq!(mirror_bracket('\u{ab}'), '\u{bb}');
        assert_eq!(mirror_bracket('x'), 'x');
    }
}
