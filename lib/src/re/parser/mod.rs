/*! Parses patterns into an [`Ast`].

The parser is a recursive descent parser that works directly on the
characters of the pattern. Besides building the syntax tree, it assigns
numbers to capturing groups in the order their opening parenthesis appear,
resolves group names, applies inline flags to the scope where they are
declared, and checks that lookbehind assertions have a fixed width.
*/

use rustc_hash::FxHashMap;

use crate::errors::SyntaxError;
use crate::re::ast::{
    Assertion, Ast, Condition, Conditional, Group, GroupKind, Repetition,
};
use crate::re::blockset::CodePointSet;
use crate::re::category;
use crate::re::{Flags, GroupMode};

mod class;

#[cfg(test)]
mod tests;

/// Result of parsing a pattern.
#[derive(Debug)]
pub(crate) struct ParsedPattern {
    pub ast: Ast,
    /// Number of groups, including group 0, which is the whole match.
    pub group_count: usize,
    /// Maps group names to group numbers.
    pub names: FxHashMap<String, usize>,
}

/// A pattern parser.
pub(crate) struct Parser {
    flags: Flags,
}

impl Parser {
    pub fn new() -> Self {
        Self { flags: Flags::empty() }
    }

    /// Flags in effect at the start of the pattern.
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Parses the pattern and returns its syntax tree.
    pub fn parse(&self, pattern: &str) -> Result<ParsedPattern, SyntaxError> {
        let mut state = ParserState {
            chars: pattern.chars().collect(),
            pos: 0,
            flags: self.flags,
            next_group: 1,
            group_count: 1,
            names: FxHashMap::default(),
        };

        let ast = state.parse_alternation(0)?;

        // `parse_alternation` only stops before the end of the pattern when
        // it finds a closing parenthesis, and at depth 0 that's an error
        // that `parse_concat` already reports.
        debug_assert!(state.pos == state.chars.len());

        Ok(ParsedPattern {
            ast,
            group_count: state.group_count,
            names: state.names,
        })
    }
}

struct ParserState {
    chars: Vec<char>,
    pos: usize,
    flags: Flags,
    next_group: usize,
    group_count: usize,
    names: FxHashMap<String, usize>,
}

impl ParserState {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Skips white space if the pattern is being parsed with the
    /// [`Flags::IGNORE_SPACES`] flag.
    fn skip_ignored(&mut self) {
        if self.flags.contains(Flags::IGNORE_SPACES) {
            self.skip_whitespace();
        }
    }

    /// Consumes characters while `pred` is true and returns them.
    fn take_while<P: Fn(char) -> bool>(&mut self, pred: P) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            s.push(c);
            self.pos += 1;
        }
        s
    }

    fn error_at<M: Into<String>>(
        &self,
        message: M,
        pos: usize,
    ) -> SyntaxError {
        SyntaxError::new(message, pos)
    }

    fn error<M: Into<String>>(&self, message: M) -> SyntaxError {
        SyntaxError::new(message, self.pos)
    }

    fn new_group(&mut self) -> usize {
        let index = self.next_group;
        self.next_group += 1;
        self.group_count = self.group_count.max(self.next_group);
        index
    }

    /// Resolves a group reference, which is either a group number or a
    /// group name.
    fn resolve_group(
        &self,
        name: &str,
        pos: usize,
    ) -> Result<usize, SyntaxError> {
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            return name
                .parse()
                .map_err(|_| self.error_at("invalid group number", pos));
        }
        self.names.get(name).copied().ok_or_else(|| {
            self.error_at(
                format!("backreference to unknown group: {}", name),
                pos,
            )
        })
    }

    fn parse_alternation(&mut self, depth: usize) -> Result<Ast, SyntaxError> {
        let mut alternatives = vec![self.parse_concat(depth)?];
        while self.eat('|') {
            alternatives.push(self.parse_concat(depth)?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.pop().unwrap_or(Ast::Empty))
        } else {
            Ok(Ast::Alternation(alternatives))
        }
    }

    fn parse_concat(&mut self, depth: usize) -> Result<Ast, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_ignored();
            let start = self.pos;
            let c = match self.peek() {
                Some(c) => c,
                None => break,
            };
            match c {
                '|' => break,
                ')' if depth == 0 => {
                    return Err(self.error("unbalanced parenthesis"))
                }
                ')' => break,
                '*' | '+' | '?' => {
                    self.bump();
                    let (min, max) = match c {
                        '*' => (0, None),
                        '+' => (1, None),
                        _ => (0, Some(1)),
                    };
                    self.repeat(&mut items, min, max, c, start)?;
                }
                '{' => match self.parse_limits()? {
                    Some((min, max)) => {
                        self.repeat(&mut items, min, max, c, start)?
                    }
                    None => items.push(self.parse_brace()?),
                },
                '(' => {
                    if let Some(ast) = self.parse_group(depth)? {
                        items.push(ast)
                    }
                }
                '\\' if self.peek_at(1) == Some('Q') => {
                    self.pos += 2;
                    while self.pos < self.chars.len() {
                        if self.peek() == Some('\\')
                            && self.peek_at(1) == Some('E')
                        {
                            self.pos += 2;
                            break;
                        }
                        let c = self.chars[self.pos];
                        self.pos += 1;
                        items.push(self.literal(c));
                    }
                }
                _ => items.push(self.parse_atom()?),
            }
        }
        Ok(match items.len() {
            0 => Ast::Empty,
            1 => items.pop().unwrap_or(Ast::Empty),
            _ => Ast::Concat(items),
        })
    }

    /// Applies a quantifier to the last item in `items`.
    fn repeat(
        &mut self,
        items: &mut Vec<Ast>,
        min: u32,
        max: Option<u32>,
        quantifier: char,
        start: usize,
    ) -> Result<(), SyntaxError> {
        let greedy = !self.eat('?');
        match items.pop() {
            None | Some(Ast::Repetition(_)) => Err(self.error_at(
                format!("missing term before {}", quantifier),
                start,
            )),
            Some(body) => {
                items.push(Ast::Repetition(Box::new(Repetition {
                    body,
                    min,
                    max,
                    greedy,
                })));
                Ok(())
            }
        }
    }

    /// Parses a bounded quantifier like `{2}`, `{2,}`, `{,5}` or `{2,5}`.
    ///
    /// Returns `None` without consuming anything if the opening brace is
    /// not followed by a number or a comma, as braces are also used for
    /// `{\name}` back-references and `{Name}` categories.
    fn parse_limits(
        &mut self,
    ) -> Result<Option<(u32, Option<u32>)>, SyntaxError> {
        let start = self.pos;
        let mut n = 1;
        while self.peek_at(n).is_some_and(char::is_whitespace) {
            n += 1;
        }
        if !self.peek_at(n).is_some_and(|c| c.is_ascii_digit() || c == ',') {
            return Ok(None);
        }

        let malformed = |s: &Self| s.error_at("malformed quantifier", start);
        let number = |s: &mut Self| -> Result<Option<u32>, SyntaxError> {
            s.skip_whitespace();
            let digits = s.take_while(|c| c.is_ascii_digit());
            s.skip_whitespace();
            if digits.is_empty() {
                Ok(None)
            } else {
                digits.parse().map(Some).map_err(|_| malformed(s))
            }
        };

        self.bump();
        let min = number(self)?;
        let max = if self.eat(',') { number(self)? } else { min };
        if !self.eat('}') {
            return Err(malformed(self));
        }

        let min = min.unwrap_or(0);
        if max.is_some_and(|max| max < min) {
            return Err(malformed(self));
        }
        Ok(Some((min, max)))
    }

    /// Parses a brace that doesn't start a quantifier. It can be a
    /// `{\name}` back-reference, a `{Name}` Unicode category, or just a
    /// literal brace.
    fn parse_brace(&mut self) -> Result<Ast, SyntaxError> {
        let start = self.pos;
        self.bump();

        if self.eat('\\') {
            let mut mode = GroupMode::empty();
            loop {
                self.skip_whitespace();
                match self.peek() {
                    Some(c) if c.is_ascii_punctuation() && c != '}' => {
                        mode |= GroupMode::from_char(c);
                        self.bump();
                    }
                    _ => break,
                }
            }
            let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
            self.skip_whitespace();
            if name.is_empty() || !self.eat('}') {
                return Err(self.error_at("malformed back-reference", start));
            }
            let group = self.resolve_group(&name, start)?;
            return Ok(self.back_reference(group, mode));
        }

        let save = self.pos;
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
        if !name.is_empty() && self.eat('}') {
            if let Some(set) = category::unicode_property(&name) {
                return Ok(Ast::Class(Box::new(self.case_closed(set))));
            }
        }
        self.pos = save;
        Ok(self.literal('{'))
    }

    fn parse_atom(&mut self) -> Result<Ast, SyntaxError> {
        let c = match self.bump() {
            Some(c) => c,
            None => return Err(self.error("unexpected end of pattern")),
        };
        Ok(match c {
            '.' => Ast::Any { dot_all: self.flags.contains(Flags::DOTALL) },
            '^' if self.flags.contains(Flags::MULTILINE) => {
                Ast::Assertion(Assertion::LineStart)
            }
            '^' => Ast::Assertion(Assertion::Start),
            '$' if self.flags.contains(Flags::MULTILINE) => {
                Ast::Assertion(Assertion::LineEnd)
            }
            '$' => Ast::Assertion(Assertion::EndOfLine),
            '[' => {
                self.pos -= 1;
                Ast::Class(Box::new(self.parse_class()?))
            }
            '\\' => self.parse_escape()?,
            c => self.literal(c),
        })
    }

    /// Returns the expression that matches the character `c`, taking the
    /// case-insensitive flag into account.
    fn literal(&self, c: char) -> Ast {
        if self.flags.contains(Flags::IGNORE_CASE) {
            let mut set = CodePointSet::new();
            for variant in category::case_variants(c) {
                set.insert(variant);
            }
            if set.weight() > 1 {
                return Ast::Class(Box::new(set));
            }
        }
        Ast::Literal(c)
    }

    /// Adds case variants to a set if the pattern is case-insensitive.
    fn case_closed(&self, mut set: CodePointSet) -> CodePointSet {
        if self.flags.contains(Flags::IGNORE_CASE) {
            category::add_case_variants(&mut set);
        }
        set
    }

    fn back_reference(&self, group: usize, mut mode: GroupMode) -> Ast {
        if self.flags.contains(Flags::IGNORE_CASE) {
            mode |= GroupMode::IGNORE_CASE;
        }
        Ast::BackRef { group, mode }
    }

    /// Parses an escape sequence outside a character class. The backslash
    /// was already consumed.
    fn parse_escape(&mut self) -> Result<Ast, SyntaxError> {
        let start = self.pos - 1;
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(self.error_at("escape without a character", start))
            }
        };
        let unicode = self.flags.contains(Flags::UNICODE);
        Ok(match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'h' | 'H' | 'v' | 'V' => {
                Ast::Class(Box::new(self.perl_class(c)))
            }
            'p' | 'P' => {
                Ast::Class(Box::new(self.parse_property(c == 'P', start)?))
            }
            'b' | 'B' => Ast::Boundary {
                word: Box::new(category::word(unicode)),
                negated: c == 'B',
            },
            '<' | '>' => Ast::Direction {
                word: Box::new(category::word(unicode)),
                end: c == '>',
            },
            'A' => Ast::Assertion(Assertion::Start),
            'Z' => Ast::Assertion(Assertion::EndOfLine),
            'z' => Ast::Assertion(Assertion::End),
            'G' => Ast::Assertion(Assertion::LastMatchEnd),
            'k' => {
                let close = match self.bump() {
                    Some('<') => '>',
                    Some('{') => '}',
                    _ => {
                        return Err(
                            self.error_at("malformed back-reference", start)
                        )
                    }
                };
                let name = self.take_while(|c| c != close);
                if !self.eat(close) || name.is_empty() {
                    return Err(
                        self.error_at("malformed back-reference", start)
                    );
                }
                let group = self.resolve_group(&name, start)?;
                self.back_reference(group, GroupMode::empty())
            }
            '1'..='9' => {
                let mut digits = c.to_string();
                digits.push_str(&self.take_while(|c| c.is_ascii_digit()));
                let group = self.resolve_group(&digits, start)?;
                self.back_reference(group, GroupMode::empty())
            }
            c => {
                let c = self.escaped_char(c, start)?;
                self.literal(c)
            }
        })
    }

    /// Returns the character represented by an escape sequence like `\n`,
    /// `\x41` or `é`. `c` is the character after the backslash, and
    /// `start` the position of the backslash.
    fn escaped_char(
        &mut self,
        c: char,
        start: usize,
    ) -> Result<char, SyntaxError> {
        let hex = |s: &mut Self, digits: String| {
            u32::from_str_radix(&digits, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| s.error_at("malformed hex escape", start))
        };
        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'f' => Ok('\x0C'),
            'e' => Ok('\x1B'),
            'a' => Ok('\x07'),
            '0' => {
                let mut value = 0;
                for _ in 0..3 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) if value * 8 + d <= 0xFF => {
                            value = value * 8 + d;
                            self.bump();
                        }
                        _ => break,
                    }
                }
                Ok(char::from(value as u8))
            }
            'x' if self.eat('{') => {
                let digits = self.take_while(|c| c.is_ascii_hexdigit());
                if digits.is_empty() || !self.eat('}') {
                    return Err(self.error_at("malformed hex escape", start));
                }
                hex(self, digits)
            }
            'x' | 'u' => {
                let len = if c == 'x' { 2 } else { 4 };
                let digits: String = (0..len)
                    .map_while(|n| {
                        self.peek_at(n).filter(|c| c.is_ascii_hexdigit())
                    })
                    .collect();
                if digits.len() != len {
                    return Err(self.error_at("malformed hex escape", start));
                }
                self.pos += len;
                hex(self, digits)
            }
            'c' => match self.bump() {
                Some(c) if c.is_ascii() => {
                    Ok(char::from(c.to_ascii_uppercase() as u8 ^ 0x40))
                }
                _ => Err(self.error_at("malformed control escape", start)),
            },
            c if c.is_ascii_alphanumeric() => Err(self.error_at(
                format!("unknown escape sequence \\{}", c),
                start,
            )),
            c => Ok(c),
        }
    }

    /// Returns the set for one of `\d`, `\w`, `\s`, `\h`, `\v` or their
    /// negated forms.
    fn perl_class(&self, c: char) -> CodePointSet {
        let unicode = self.flags.contains(Flags::UNICODE);
        let mut set = match c.to_ascii_lowercase() {
            'd' => category::digit(unicode),
            'w' => category::word(unicode),
            's' => category::space(unicode),
            'h' => category::horizontal_space(unicode),
            _ => category::vertical_space(unicode),
        };
        if c.is_ascii_uppercase() {
            set.negate();
        }
        set
    }

    /// Parses the name after `\p` or `\P`, which can be a single letter or
    /// a name enclosed in braces.
    fn parse_property(
        &mut self,
        negated: bool,
        start: usize,
    ) -> Result<CodePointSet, SyntaxError> {
        let name = if self.eat('{') {
            let name = self.take_while(|c| c != '}');
            if !self.eat('}') {
                return Err(
                    self.error_at("malformed character category", start)
                );
            }
            name
        } else {
            match self.bump() {
                Some(c) if c.is_alphabetic() => c.to_string(),
                _ => {
                    return Err(
                        self.error_at("malformed character category", start)
                    )
                }
            }
        };
        let mut set = category::unicode_property(name.trim())
            .map(|set| self.case_closed(set))
            .ok_or_else(|| {
                self.error_at(
                    format!("unknown character category: {}", name),
                    start,
                )
            })?;
        if negated {
            set.negate();
        }
        Ok(set)
    }

    /// Parses anything that starts with an opening parenthesis. Returns
    /// `None` for constructs that don't produce any expression, like
    /// comments and inline flags.
    fn parse_group(
        &mut self,
        depth: usize,
    ) -> Result<Option<Ast>, SyntaxError> {
        let start = self.pos;
        self.bump();

        if self.peek() == Some('{') {
            return self.parse_braced_group(depth, start).map(Some);
        }

        if !self.eat('?') {
            let index = self.new_group();
            let body = self.parse_group_body(depth, start)?;
            return Ok(Some(group(GroupKind::Capture(index), body)));
        }

        let kind = match self.bump() {
            Some(':') => GroupKind::NonCapture,
            Some('=') => GroupKind::Lookahead { negative: false },
            Some('!') => GroupKind::Lookahead { negative: true },
            Some('>') => GroupKind::Atomic,
            Some('<') if matches!(self.peek(), Some('=') | Some('!')) => {
                let negative = self.bump() == Some('!');
                let body = self.parse_group_body(depth, start)?;
                let width = body
                    .fixed_width()
                    .map_err(|msg| self.error_at(msg, start))?;
                return Ok(Some(group(
                    GroupKind::Lookbehind { negative, width },
                    body,
                )));
            }
            Some('<') => {
                let name = self.take_while(|c| c != '>');
                if !self.eat('>') {
                    return Err(self.error_at("malformed group name", start));
                }
                let index = self.declare_group(&name, false, start)?;
                GroupKind::Capture(index)
            }
            Some('#') => {
                self.take_while(|c| c != ')');
                if !self.eat(')') {
                    return Err(self.error_at("unterminated comment", start));
                }
                return Ok(None);
            }
            Some('(') => return self.parse_conditional(depth, start).map(Some),
            Some('[') => {
                self.pos -= 1;
                return self.parse_class_group(start).map(Some);
            }
            Some(c) if c == '-' || Flags::from_letter(c).is_some() => {
                self.pos -= 1;
                return self.parse_flags(depth, start);
            }
            _ => return Err(self.error_at("wrong char after (?", start)),
        };

        let body = self.parse_group_body(depth, start)?;
        Ok(Some(group(kind, body)))
    }

    /// Parses the body of a group and the closing parenthesis. Inline flags
    /// found within the body don't affect the rest of the pattern.
    fn parse_group_body(
        &mut self,
        depth: usize,
        start: usize,
    ) -> Result<Ast, SyntaxError> {
        let flags = self.flags;
        let body = self.parse_alternation(depth + 1)?;
        self.flags = flags;
        if !self.eat(')') {
            return Err(self.error_at("unbalanced parenthesis", start));
        }
        Ok(body)
    }

    /// Registers a group name and returns its number. If `reassign` is true
    /// and the name already exists the existing number is returned, if not
    /// an error is returned.
    fn declare_group(
        &mut self,
        name: &str,
        reassign: bool,
        start: usize,
    ) -> Result<usize, SyntaxError> {
        let valid = name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if name.is_empty() || !valid {
            return Err(
                self.error_at(format!("invalid group name: {}", name), start)
            );
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error_at(
                format!("group name must not start with a digit: {}", name),
                start,
            ));
        }
        match self.names.get(name) {
            Some(index) if reassign => Ok(*index),
            Some(_) => Err(
                self.error_at(format!("group redeclaration: {}", name), start)
            ),
            None => {
                let index = self.new_group();
                self.names.insert(name.to_string(), index);
                Ok(index)
            }
        }
    }

    /// Parses groups like `({name}...)`, `({=name}...)` and `({2}...)`.
    fn parse_braced_group(
        &mut self,
        depth: usize,
        start: usize,
    ) -> Result<Ast, SyntaxError> {
        self.bump();
        self.skip_whitespace();
        let reassign = self.eat('=');
        self.skip_whitespace();
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
        self.skip_whitespace();
        if !self.eat('}') {
            return Err(self.error_at("malformed group name", start));
        }

        let index = if name.chars().all(|c| c.is_ascii_digit()) {
            let index: usize = name
                .parse()
                .map_err(|_| self.error_at("invalid group number", start))?;
            self.group_count = self.group_count.max(index + 1);
            index
        } else {
            self.declare_group(&name, reassign, start)?
        };

        let body = self.parse_group_body(depth, start)?;
        Ok(group(GroupKind::Capture(index), body))
    }

    /// Parses inline flags like `(?i)`, `(?m-s)` or `(?x:...)`. The leading
    /// `(?` was already consumed.
    fn parse_flags(
        &mut self,
        depth: usize,
        start: usize,
    ) -> Result<Option<Ast>, SyntaxError> {
        let mut on = Flags::empty();
        let mut off = Flags::empty();
        let mut negate = false;
        loop {
            match self.bump() {
                Some('-') => negate = true,
                Some(')') => {
                    self.flags = (self.flags | on) - off;
                    return Ok(None);
                }
                Some(':') => {
                    let saved = self.flags;
                    self.flags = (self.flags | on) - off;
                    let body = self.parse_group_body(depth, start);
                    self.flags = saved;
                    return Ok(Some(group(GroupKind::NonCapture, body?)));
                }
                Some(c) => match Flags::from_letter(c) {
                    Some(flag) if negate => off |= flag,
                    Some(flag) => on |= flag,
                    None => {
                        return Err(
                            self.error_at("wrong char after (?", self.pos - 1)
                        )
                    }
                },
                None => {
                    return Err(self.error_at("unbalanced parenthesis", start))
                }
            }
        }
    }

    /// Parses a conditional expression. The leading `(?(` was already
    /// consumed.
    fn parse_conditional(
        &mut self,
        depth: usize,
        start: usize,
    ) -> Result<Ast, SyntaxError> {
        let condition = if self.eat('?') {
            match (self.bump(), self.peek()) {
                (Some('='), _) | (Some('!'), _) => {
                    let negative = self.chars[self.pos - 1] == '!';
                    let body = self.parse_group_body(depth, start)?;
                    Condition::Lookahead { negative, body }
                }
                (Some('<'), Some('=')) | (Some('<'), Some('!')) => {
                    let negative = self.bump() == Some('!');
                    let body = self.parse_group_body(depth, start)?;
                    let width = body
                        .fixed_width()
                        .map_err(|msg| self.error_at(msg, start))?;
                    Condition::Lookbehind { negative, width, body }
                }
                _ => {
                    return Err(self.error_at("wrong char after (?(?", start))
                }
            }
        } else {
            let name = self.take_while(|c| c != ')');
            if !self.eat(')') {
                return Err(self.error_at("unbalanced parenthesis", start));
            }
            Condition::Captured(self.resolve_group(name.trim(), start)?)
        };

        let (yes, no) = match self.parse_group_body(depth, start)? {
            Ast::Alternation(mut branches) if branches.len() == 2 => {
                let no = branches.pop();
                (branches.pop().unwrap_or(Ast::Empty), no)
            }
            Ast::Alternation(_) => {
                return Err(self.error_at(
                    "conditional expression with more than two branches",
                    start,
                ))
            }
            yes => (yes, None),
        };

        Ok(Ast::Conditional(Box::new(Conditional { condition, yes, no })))
    }

    /// Parses a class group like `(?[a-z]&[^aeiou])`, where classes are
    /// combined with `+` (union), `-` (difference) and `&` (intersection).
    /// The leading `(?` was already consumed.
    fn parse_class_group(&mut self, start: usize) -> Result<Ast, SyntaxError> {
        // The operations act on the stored members, so a negated first
        // operand is materialized into a positive set.
        let mut set = CodePointSet::new();
        set.add(&self.parse_class()?, false);
        loop {
            self.skip_whitespace();
            let op = match self.bump() {
                Some(')') => break,
                Some(op @ ('+' | '-' | '&')) => op,
                _ => return Err(self.error_at("malformed class group", start)),
            };
            self.skip_whitespace();
            if self.peek() != Some('[') {
                return Err(self.error_at("malformed class group", start));
            }
            let other = self.parse_class()?;
            match op {
                '+' => set.add(&other, false),
                '-' => set.subtract(&other, false),
                _ => set.intersect(&other, false),
            };
        }
        Ok(Ast::Class(Box::new(set)))
    }
}

fn group(kind: GroupKind, body: Ast) -> Ast {
    Ast::Group(Box::new(Group { kind, body }))
}
