/*! Parsing, compilation and execution of regular expressions.

A pattern goes through four stages before it can be used for matching. The
[`parser`] turns the pattern text into an abstract syntax tree, resolving
group names, inline flags and character classes along the way. The
[`compiler`] turns the syntax tree into a graph of instructions (see
[`program`]), where every instruction has two successors: `next`, followed
when the instruction succeeds, and `fail_next`, which is an alternative path
pushed into the backtracking stack by branching instructions. The
[`optimizer`] looks for a character that every match must contain at a known
distance from its start and rewrites the entry point of the graph, so that
the input can be scanned for that character instead of trying the whole
graph at every position. Finally, the [`matcher`] walks the graph against the
input with a backtracking virtual machine.
*/

use bitflags::bitflags;

pub(crate) mod ast;
pub mod blockset;
pub(crate) mod category;
pub(crate) mod compiler;
pub mod matcher;
pub(crate) mod optimizer;
pub(crate) mod parser;
pub(crate) mod program;

bitflags! {
    /// Flags that control how a pattern is compiled.
    ///
    /// Flags can also be turned on and off within the pattern itself with
    /// inline groups like `(?i)` or `(?-m:...)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u16 {
        /// `i`: letters match regardless of their case.
        const IGNORE_CASE   = 0x01;
        /// `m`: `^` and `$` match at the start and end of every line.
        const MULTILINE     = 0x02;
        /// `s`: `.` matches line terminators too.
        const DOTALL        = 0x04;
        /// `x`: white space in the pattern is ignored.
        const IGNORE_SPACES = 0x08;
        /// `u`: `\w`, `\d`, `\s` and `\b` use Unicode definitions.
        const UNICODE       = 0x10;
        /// `X`: classes accept the XML schema subtraction syntax
        /// `[a-z-[aeiou]]`.
        const XML_SCHEMA    = 0x20;
    }
}

impl Flags {
    /// Returns the flag that corresponds to a letter used in inline flag
    /// groups, or `None` if the letter is not a flag.
    pub fn from_letter(c: char) -> Option<Flags> {
        match c {
            'i' => Some(Flags::IGNORE_CASE),
            'm' => Some(Flags::MULTILINE),
            's' => Some(Flags::DOTALL),
            'x' => Some(Flags::IGNORE_SPACES),
            'u' => Some(Flags::UNICODE),
            'X' => Some(Flags::XML_SCHEMA),
            _ => None,
        }
    }

    /// Parses a string of flag letters like `"imx"`. Returns `None` if some
    /// letter is not a flag.
    pub fn parse(letters: &str) -> Option<Flags> {
        letters.chars().try_fold(Flags::empty(), |flags, c| {
            Some(flags | Flags::from_letter(c)?)
        })
    }
}

bitflags! {
    /// How the text of a group is transformed when it is compared against
    /// the input (back-references) or copied (substitutions).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GroupMode: u8 {
        /// Characters are compared after case folding.
        const IGNORE_CASE = 0x01;
        /// The group is read from right to left.
        const REVERSE     = 0x02;
        /// Opening brackets are replaced by closing ones and vice versa.
        const BRACKET     = 0x04;
    }
}

impl GroupMode {
    /// Returns the mode that corresponds to one of the characters that
    /// prefix group references in `{\@name}` and `${@name}`. Characters
    /// that don't correspond to any mode are ignored.
    pub(crate) fn from_char(c: char) -> GroupMode {
        match c {
            '@' => GroupMode::IGNORE_CASE,
            '/' => GroupMode::REVERSE,
            ':' => GroupMode::BRACKET,
            _ => GroupMode::empty(),
        }
    }
}

/// Returns true if `c` terminates a line.
#[inline]
pub(crate) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}
