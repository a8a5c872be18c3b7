use std::iter::FusedIterator;

use crate::re::matcher::{GroupId, Matcher};

/// Iterator over the pieces of a text delimited by the matches of a
/// pattern.
///
/// The text after the last match is the last token. Empty tokens, like the
/// one between two adjacent matches, are skipped unless the tokenizer is
/// created with [`Tokenizer::allow_empty`].
///
/// ```
/// # use retrace::Pattern;
/// let pattern = Pattern::new(r"\s*,\s*").unwrap();
/// let tokens: Vec<String> = pattern.tokenizer("a , b,,c").collect();
/// assert_eq!(tokens, vec!["a", "b", "c"]);
/// ```
pub struct Tokenizer<'t> {
    matcher: Matcher<'t>,
    pos: usize,
    allow_empty: bool,
    done: bool,
}

impl<'t> Tokenizer<'t> {
    /// Creates a tokenizer that splits the target of `matcher`, starting
    /// from its beginning.
    pub fn new(mut matcher: Matcher<'t>) -> Self {
        matcher.set_position(0);
        Self { matcher, pos: 0, allow_empty: false, done: false }
    }

    /// Makes the tokenizer return empty tokens too.
    pub fn allow_empty(mut self, yes: bool) -> Self {
        self.allow_empty = yes;
        self
    }

    fn token(&self, end: usize) -> String {
        self.matcher.target_chars()[self.pos..end].iter().collect()
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let (token, next) = if self.matcher.find() {
                match self.matcher.span(GroupId::Index(0)) {
                    Some(span) => (self.token(span.start), span.end),
                    None => break,
                }
            } else {
                self.done = true;
                let end = self.matcher.target_chars().len();
                (self.token(end), end)
            };
            self.pos = next;
            if self.allow_empty || !token.is_empty() {
                return Some(token);
            }
        }
        None
    }
}

impl FusedIterator for Tokenizer<'_> {}
