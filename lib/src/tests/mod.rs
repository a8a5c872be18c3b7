/*! End-to-end tests.

Every pattern is compiled twice, with and without the scan optimizer, and
both versions must produce exactly the same results.
*/
use std::ops::Range;

use pretty_assertions::assert_eq;

use crate::{Anchors, Config, Flags, GroupId, Matcher, Pattern};

/// Compiles `pattern` with and without the optimizer.
fn compile(pattern: &str) -> [Pattern; 2] {
    let plain = Config { optimize: false, ..Config::default() };
    [&Config::default(), &plain].map(|config| {
        Pattern::with_config(pattern, Flags::empty(), config)
            .unwrap_or_else(|err| panic!("`{}`: {}", pattern, err))
    })
}

/// Span and groups of every match found by calling `find` repeatedly.
fn all_matches(matcher: &mut Matcher) -> Vec<Vec<Option<String>>> {
    let mut result = vec![];
    while matcher.find() {
        result.push(
            (0..matcher.group_count()).map(|g| matcher.group(g)).collect(),
        );
    }
    result
}

/// Runs `f` with both versions of the pattern and checks that the results
/// are the same. Returns the result.
fn same_results<T, F>(pattern: &str, text: &str, f: F) -> T
where
    T: PartialEq + std::fmt::Debug,
    F: Fn(&mut Matcher) -> T,
{
    let [optimized, plain] = compile(pattern);
    let expected = f(&mut plain.matcher(text));
    let actual = f(&mut optimized.matcher(text));
    assert_eq!(
        actual, expected,
        "\n\n`{}` on {:?}: optimized and plain patterns differ",
        pattern, text
    );
    expected
}

macro_rules! assert_match {
    ($pattern:expr, $text:expr) => {{
        assert!(
            same_results($pattern, $text, |m| m.find()),
            "\n\n`{}` should match {:?}",
            $pattern,
            $text
        );
    }};
}

macro_rules! assert_no_match {
    ($pattern:expr, $text:expr) => {{
        assert!(
            !same_results($pattern, $text, |m| m.find()),
            "\n\n`{}` should not match {:?}",
            $pattern,
            $text
        );
    }};
}

/// Checks the groups of the first match. `None` stands for a group that
/// didn't participate in the match.
macro_rules! assert_groups {
    ($pattern:expr, $text:expr, [$($group:expr),* $(,)?]) => {{
        let groups = same_results($pattern, $text, |m| {
            m.find();
            (0..m.group_count()).map(|g| m.group(g)).collect::<Vec<_>>()
        });
        let expected: Vec<Option<&str>> = vec![$($group),*];
        assert_eq!(
            groups.iter().map(|g| g.as_deref()).collect::<Vec<_>>(),
            expected,
            "\n\ngroups of `{}` on {:?}",
            $pattern,
            $text
        );
    }};
}

/// Checks the text of every match found by calling `find` repeatedly.
macro_rules! assert_find_all {
    ($pattern:expr, $text:expr, [$($found:expr),* $(,)?]) => {{
        let found = same_results($pattern, $text, |m| m.found_strings());
        let expected: Vec<&str> = vec![$($found),*];
        assert_eq!(found, expected, "\n\n`{}` on {:?}", $pattern, $text);
    }};
}

#[test]
fn literals() {
    assert_groups!("abc", "xxabcxx", [Some("abc")]);
    assert_match!("", "");
    assert_match!("a", "ba");
    assert_no_match!("abc", "ab");
    assert_no_match!("abc", "");
    assert_find_all!("ab", "abxabab", ["ab", "ab", "ab"]);
    assert_find_all!(r"\Qa.b\E", "axb a.b", ["a.b"]);
    assert_find_all!("é", "éaé", ["é", "é"]);
}

#[test]
fn repetitions() {
    assert_groups!("a+", "baaa", [Some("aaa")]);
    assert_groups!("a+?", "baaa", [Some("a")]);
    assert_groups!("ba*?", "baaa", [Some("b")]);
    assert_groups!("ba*?$", "baaa", [Some("baaa")]);
    assert_find_all!("a{2}", "aaaaa", ["aa", "aa"]);
    assert_find_all!("a{2,3}", "aaaaa", ["aaa", "aa"]);
    assert_find_all!("a{2,}", "a aa aaaa", ["aa", "aaaa"]);
    assert_find_all!("x[ab]{1,2}?y", "xay xaby xy", ["xay", "xaby"]);
    assert_groups!("(ab)+", "abababc", [Some("ababab"), Some("ab")]);
    assert_groups!("(ab)+?c", "ababc", [Some("ababc"), Some("ab")]);
    assert_groups!("(a|b){2,3}c", "ababc", [Some("babc"), Some("b")]);
    assert_groups!(r"\d+7", "1237 7", [Some("1237")]);
    assert_groups!(r"<.*>", "<a><b>", [Some("<a><b>")]);
    assert_groups!(r"<.*?>", "<a><b>", [Some("<a>")]);
}

#[test]
fn empty_iterations() {
    // Loops whose body can match an empty string must terminate.
    assert_find_all!("(a*)*b", "aab", ["aab"]);
    assert_find_all!("(a|)*c", "aac", ["aac"]);
    assert_find_all!("(a?)*?b", "xaab", ["aab"]);
    assert_match!("(x*)*", "y");
    assert_no_match!("(x*)*z", "yyy");
}

#[test]
fn empty_matches() {
    assert_find_all!("a*", "bbb", ["", "", "", ""]);
    assert_find_all!("a*", "baab", ["", "aa", "", ""]);
    assert_find_all!(r"\b", "ab cd", ["", "", "", ""]);
}

#[test]
fn alternation() {
    assert_groups!("cat|category", "category", [Some("cat")]);
    assert_groups!("category|cat", "category", [Some("category")]);
    assert_groups!(
        "(a|ab)(c|bcd)(d*)",
        "abcd",
        [Some("abcd"), Some("a"), Some("bcd"), Some("")]
    );
    assert_find_all!("x|y|z", "axbycz", ["x", "y", "z"]);
    assert_find_all!("a|", "ab", ["a", "", ""]);
}

#[test]
fn groups() {
    assert_groups!("(a)(b)?", "ac", [Some("a"), Some("a"), None]);
    assert_groups!("(a)|(b)", "b", [Some("b"), None, Some("b")]);
    assert_groups!("(?:a)(b)", "ab", [Some("ab"), Some("b")]);
    assert_groups!("((a)b)c", "abc", [Some("abc"), Some("ab"), Some("a")]);
    assert_groups!("(a)*", "aaa", [Some("aaa"), Some("a")]);
    assert_groups!(
        r"(?<y>\d+)-({m}\d+)",
        "on 2024-05",
        [Some("2024-05"), Some("2024"), Some("05")]
    );
    // Plain groups are numbered independently of explicit numbers.
    assert_groups!("({2}a)(b)", "ab", [Some("ab"), Some("b"), Some("a")]);
}

#[test]
fn back_references() {
    assert_groups!(r"(\w)\1", "abccd", [Some("cc"), Some("c")]);
    assert_no_match!(r"(\w)\1", "abcd");
    assert_groups!(
        r"(?<q>['])\w+\k<q>",
        "say 'hi'",
        [Some("'hi'"), Some("'")]
    );
    assert_groups!(r"(?i)(a)\1", "aA", [Some("aA"), Some("a")]);
    assert_no_match!(r"(a)\1", "aA");
    assert_match!(r"(a)(?i:\1)", "aA");
    assert_find_all!(r"(\w+) \1", "hey hey you you2", ["hey hey", "you you"]);
    // Reversed and mirrored references.
    assert_find_all!(r"({x}\w+)\w?{\/x}", "abcba xyyx", ["abcba", "xyyx"]);
    assert_find_all!(r"({b}[(\[]+)\w*{\/:b}", "([x]) (y]", ["([x])"]);
    assert_match!(r"({x}ab){\@x}", "abAB");
    // A reference to a group that didn't participate never matches.
    assert_no_match!(r"(a)?\1b", "b");
    assert_groups!(r"(a*)\1b", "b", [Some("b"), Some("")]);
    assert_groups!(r"(a+)\1*b", "aaaab", [Some("aaaab"), Some("aaaa")]);
    assert_groups!(r"(ab)\1*?c", "ababc", [Some("ababc"), Some("ab")]);
}

#[test]
fn classes() {
    assert_find_all!("[a-c]+", "xxabcabx", ["abcab"]);
    assert_find_all!(r"[^\d\s]+", "ab 12 c3", ["ab", "c"]);
    assert_find_all!("[a-z&&[^aeiou]]+", "hello", ["h", "ll"]);
    assert_find_all!("[[:digit:]x]+", "a1x2b", ["1x2"]);
    assert_find_all!("(?[a-z]-[aeiou])+", "hello", ["h", "ll"]);
    assert_find_all!("(?[^a-z]+[0-9])+", "ab5X c", ["5X "]);
    assert_match!("(?[^a-z]&[a-f0-9])", "7");
    assert_no_match!("(?[^a-z]&[a-f0-9])", "abc");
    assert_find_all!(r"\p{Lu}+", "abcDEFg", ["DEF"]);
    assert_find_all!(r"\P{L}+", "ab12cd", ["12"]);
    assert_find_all!(r"[\p{Greek}]+", "abc αβγ", ["αβγ"]);
    assert_find_all!(r"\w+", "héllo", ["h", "llo"]);
    assert_find_all!(r"(?u)\w+", "héllo", ["héllo"]);
    assert_find_all!(r"\d", "1٣2", ["1", "2"]);
    assert_find_all!(r"(?u)\d+", "1٣2", ["1٣2"]);
    assert_find_all!(r"\s+", "a \t\nb", [" \t\n"]);
    assert_find_all!(r"\h+", "a \t\nb", [" \t"]);
    assert_find_all!(r"(?X)[a-z-[aeiou]]+", "hello", ["h", "ll"]);
}

#[test]
fn case_insensitive() {
    assert_groups!("(?i)abc", "xABCx", [Some("ABC")]);
    assert_find_all!("(?i:a)b", "Ab AB ab", ["Ab", "ab"]);
    assert_find_all!("(?i)[a-c]+", "xAbCx", ["AbC"]);
    assert_find_all!("(?i)é", "Éé", ["É", "é"]);
    assert_find_all!("a(?i)b(?-i)c", "abc aBc aBC", ["abc", "aBc"]);
    assert_find_all!(r"(?i)\bA\b", "x a ya A", ["a", "A"]);
}

#[test]
fn dot() {
    assert_no_match!("a.c", "a\nc");
    assert_no_match!("a.c", "a\rc");
    assert_match!("(?s)a.c", "a\nc");
    assert_match!("a.c", "a\u{2028}c");
}

#[test]
fn anchors() {
    assert_find_all!(r"^\w+", "ab cd", ["ab"]);
    assert_find_all!(r"(?m)^\w+$", "ab\ncd", ["ab", "cd"]);
    assert_no_match!(r"^\w+$", "ab\ncd");
    assert_match!(r"^\w+$", "ab\n");
    assert_match!(r"^\w+$", "ab\r\n");
    assert_no_match!(r"^\w+\z", "ab\n");
    assert_match!(r"^\w+\Z", "ab\n");
    assert_find_all!(r"\Aa", "aaa", ["a"]);
    assert_find_all!(r"\G\d", "12a3", ["1", "2"]);
    assert_find_all!(r"\bfoo\b", "foo afoob foo", ["foo", "foo"]);
    assert_find_all!(r"\Bo\B", "foo boot", ["o", "o", "o"]);
    assert_find_all!(r"\<\w", "ab cd", ["a", "c"]);
    assert_find_all!(r"\w\>", "ab cd", ["b", "d"]);
}

#[test]
fn lookahead() {
    assert_find_all!(r"\w+(?=!)", "hi! yo", ["hi"]);
    assert_find_all!(r"\d+(?!px)", "12px 34em", ["1", "34"]);
    assert_groups!(r"(?=(\w+))\w", "abc", [Some("a"), Some("abc")]);
    assert_no_match!(r"a(?!b)", "ab");
    assert_match!(r"a(?!b)", "ab ac");
}

#[test]
fn lookbehind() {
    assert_find_all!(r"(?<=\$)\d+", "cost $42", ["42"]);
    assert_find_all!(r"(?<!\$)\b\d+", "$42 17", ["17"]);
    assert_find_all!(r"(?<=ab|cd)x", "abx cdx efx", ["x", "x"]);
    assert_no_match!("(?<=a)b", "b");
    assert_find_all!("(?<!a)b", "b ab", ["b"]);
}

#[test]
fn atomic_groups() {
    assert_no_match!("(?>a+)ab", "aaab");
    assert_groups!("(?>a+)b", "aaab", [Some("aaab")]);
    assert_groups!("(?>(a+))b", "aaab", [Some("aaab"), Some("aaa")]);
    assert_groups!("(?>x|xy)z", "xyz xz", [Some("xz")]);
}

#[test]
fn conditionals() {
    assert_find_all!(r"(<)?\w+(?(1)>)", "<a> b", ["<a>", "b"]);
    assert_find_all!(r"(<)?\w+(?(1)>|!)", "<a> b!", ["<a>", "b!"]);
    assert_find_all!(r"(?(?=\d)\d{2}|[a-z])", "a12b3", ["a", "12", "b"]);
    assert_find_all!(r"(?(?!\d)[a-z]|\d{2})", "a12b3", ["a", "12", "b"]);
    assert_find_all!(r"(?(?<=-)\d|[a-z])", "a-1 2", ["a", "1"]);
    assert_find_all!(r"(?(?<!-)[a-z]|\d)", "a-1 2", ["a", "1"]);
    assert_find_all!(r"(?<n>x)?(?(n)y|z)", "xy z", ["xy", "z"]);
}

#[test]
fn ignore_spaces() {
    assert_match!("(?x) a b c (?# comment)", "abc");
    assert_no_match!("(?x) a b c", "a b c");
    assert_match!(r"(?x) a \  b", "a b");
    assert_match!("a(?#comment)b", "ab");
}

#[test]
fn whole_and_prefix_matches() {
    let [optimized, plain] = compile(r"\d{3}-\d{4}");
    for p in [optimized, plain] {
        assert!(p.matches("555-1234"));
        assert!(!p.matches("555-12345"));
        assert!(!p.matches("x555-1234"));
        assert!(p.starts_with("555-"));
        assert!(p.starts_with("5"));
        assert!(!p.starts_with("5-"));
    }
}

#[test]
fn proceed() {
    let found = same_results("a+", "aaa", |m| {
        let mut found = vec![];
        while m.proceed() {
            found.push(m.span(GroupId::Index(0)).unwrap());
        }
        found
    });
    assert_eq!(found, vec![0..3, 0..2, 0..1, 1..3, 1..2, 2..3]);
}

#[test]
fn optimizer_equivalence() {
    fn anchored_spans(m: &mut Matcher) -> Vec<Option<Range<usize>>> {
        let anchors = [
            Anchors::START,
            Anchors::END,
            Anchors::START | Anchors::END,
            Anchors::INCOMPLETE,
        ];
        anchors
            .into_iter()
            .map(|anchors| {
                m.set_position(0);
                m.find_anchored(anchors)
                    .then(|| m.span(GroupId::Index(0)))
                    .flatten()
            })
            .collect()
    }

    let patterns = [
        r"\d+",
        r"x\d",
        r"a.*?z",
        r"[abc]{2,}d",
        r"(\w)\1",
        r"\b(\w)x\1",
        r"(?i)ab+c",
        r"(a|b)*c",
        r"[xy]+?z",
        r"(foo|bar)baz",
        r"(?<=a)b",
        r"x{2,4}y",
        r"(ab)*?abx",
        r"(\w+)\s+\1",
        r"(?m)^x",
        r"k[^\n]*k",
        r"(?>a*)b",
        r"a[bc]{0,3}c",
        r"()\1x",
        r"x*()\1x",
        r"(x)y*\1",
        r"(?[^a-z]+[0-9])",
    ];
    let texts = [
        "",
        "abc",
        "a1b22c333",
        "xx1 x2 abz aaz",
        "aabbccd abcd",
        "foobaz barbaz fooba",
        "xay xxy xxxxxy xxxxxxy",
        "ababx abababx",
        "word word other other",
        "x\nx\nyx",
        "k k\nkk kabck",
        "aaab ab b",
        "abcc abbcc ac",
        "AbBc ABC",
        "bxb axa yzz",
        "x xx xyyx 5Q",
    ];
    for pattern in patterns {
        for text in texts {
            same_results(pattern, text, all_matches);
            same_results(pattern, text, anchored_spans);
        }
    }
}

#[test]
fn scan_with_group_references() {
    // Groups are never captured where the scan starts, and giving back
    // repetitions undoes the groups captured after them.
    assert_find_all!(r"()\1x", "x", ["x"]);
    assert_find_all!(r"x*()\1x", "xx", ["xx"]);
    assert_find_all!(r"x*(y?)\1x", "xxyx", ["xx", "x"]);
    assert_groups!(r"(a)x*\1", "axxa", [Some("axxa"), Some("a")]);
}

#[test]
fn incomplete_searches() {
    fn search(m: &mut Matcher) -> Option<Range<usize>> {
        m.find_anchored(Anchors::INCOMPLETE)
            .then(|| m.span(GroupId::Index(0)))
            .flatten()
    }

    assert_eq!(same_results(".b", "a", search), Some(0..1));
    assert_eq!(same_results("xyz", "ab xy", search), Some(3..5));
    assert_eq!(same_results("ab", "cab", search), Some(1..3));
}

#[test]
fn round_trip() {
    let corpus = [
        "", "a", "aa", "aaa", "aaaa", "ab", "AB", "Ab", "b", "c", "x", "xx",
        "1", "12", ".*", "e", "f", "abc", "cab", "bd", "AB ",
    ];
    let equivalent_forms = [
        ("a{2}", "aa"),
        ("a{1,3}", "aa?a?"),
        ("[a-c]+", "(?:a|b|c)+"),
        ("x+", "xx*"),
        (r"\d\d", "[0-9]{2}"),
        ("(?i)ab", "[aA][bB]"),
        (r"\x41\u0042", "AB"),
        (r"\Q.*\E", r"\.\*"),
        ("(?[a-f]&[^aeiou])", "[b-df]"),
        ("(?x) a b | c", "ab|c"),
        (r"(a)\1", "aa"),
    ];
    for (pattern, equivalent) in equivalent_forms {
        let original = Pattern::new(pattern).unwrap();
        // Compiling the source text of a pattern again gives the same
        // pattern.
        let recompiled =
            Pattern::with_flags(original.as_str(), original.flags()).unwrap();
        let equivalent = Pattern::new(equivalent).unwrap();
        for text in corpus {
            let expected = original.matches(text);
            assert_eq!(
                recompiled.matches(text),
                expected,
                "\n\n`{}` recompiled on {:?}",
                pattern,
                text
            );
            assert_eq!(
                equivalent.matches(text),
                expected,
                "\n\n`{}` and `{}` on {:?}",
                pattern,
                equivalent.as_str(),
                text
            );
        }
    }
}

#[test]
fn scan_threshold() {
    let strict = Config { scan_threshold: 0, ..Config::default() };
    let loose = Config { scan_threshold: 1000, ..Config::default() };
    for pattern in [r"\w+x", r"[a-f]z", r"(?i)kz", r"\d\d"] {
        let results: Vec<_> = [&strict, &loose, &Config::default()]
            .map(|config| {
                let p = Pattern::with_config(pattern, Flags::empty(), config)
                    .unwrap();
                all_matches(&mut p.matcher("ab1x cfz KZ 12 kz"))
            })
            .into_iter()
            .collect();
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }
}

#[test]
fn determinism() {
    let p = Pattern::new(r"(\w+)@(\w+)\.com").unwrap();
    let text = "a@b.com, cc@dd.com, x@y.org";
    let first = all_matches(&mut p.matcher(text));
    let second = all_matches(&mut p.matcher(text));
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn shared_between_threads() {
    let p = Pattern::new(r"\d+").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let p = p.clone();
            std::thread::spawn(move || {
                p.matcher(&format!("a{}b{}", n, n * 10)).found_strings()
            })
        })
        .collect();
    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            vec![n.to_string(), (n * 10).to_string()]
        );
    }
}

#[test]
fn syntax_errors() {
    let error = |pattern: &str| match Pattern::new(pattern) {
        Ok(_) => panic!("`{}` should fail", pattern),
        Err(err) => err,
    };
    assert_eq!(
        error("a{5,2}").to_string(),
        "malformed quantifier at offset 1"
    );
    assert!(error("(a").offset() <= 2);
    error("a)");
    error("[a-");
    error("(?z)");
    error(r"\k<nope>");
    error("(?(1)a|b|c)");
    error("*a");
}

#[test]
fn replacement() {
    let p = Pattern::new(r"\b(\d+)\b").unwrap();
    assert_eq!(p.replace_all("abc 123 def", "'$1'").unwrap(), "abc '123' def");
}
