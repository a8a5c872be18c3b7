/*! Replacement of the matches of a pattern.

A [`Replacer`] combines a [`Pattern`] with a [`Substitution`], which produces
the text that replaces each match. The most common substitution is a
[`PerlSubstitution`], built from templates like `"<$1>"` where `$1` stands
for the text captured by the first group.

Matches are replaced from left to right. An empty match found right where
the previous match ended is not replaced, so that replacing `a*` with `-`
in `"baac"` produces `"-b-c-"`, instead of inserting an extra `-` after
`aa`.
*/

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::io;
use std::sync::Arc;

use crate::errors::Error;
use crate::re::matcher::{GroupId, Matcher};
use crate::Pattern;

pub use substitution::LiteralSubstitution;
pub use substitution::PerlSubstitution;
pub use substitution::Substitution;
pub use substitution::TableSubstitution;

mod substitution;


/// Replaces the matches of a pattern in a text.
///
/// A replacer is immutable, and can be used for any number of texts, even
/// from multiple threads at the same time.
#[derive(Clone)]
pub struct Replacer {
    pattern: Pattern,
    substitution: Arc<dyn Substitution>,
}

impl Replacer {
    /// Creates a replacer that substitutes the matches of `pattern` with a
    /// Perl-like template. See [`PerlSubstitution`] for the syntax.
    ///
    /// Returns [`Error::UnknownGroup`] if the template references a group
    /// name that the pattern doesn't declare.
    pub fn new(pattern: Pattern, template: &str) -> Result<Self, Error> {
        let substitution = PerlSubstitution::new(template, &pattern)?;
        Ok(Self::with_substitution(pattern, substitution))
    }

    /// Creates a replacer that substitutes the matches of `pattern` with
    /// `text`, which is copied as is.
    pub fn literal<T: Into<String>>(pattern: Pattern, text: T) -> Self {
        Self::with_substitution(pattern, LiteralSubstitution::new(text))
    }

    pub fn with_substitution<S: Substitution + 'static>(
        pattern: Pattern,
        substitution: S,
    ) -> Self {
        Self { pattern, substitution: Arc::new(substitution) }
    }

    /// Creates a replacer that looks for the keys of a table and replaces
    /// each of them with the corresponding value.
    ///
    /// Keys are tried in the order they are given, and the first one that
    /// matches at some position wins. A key that starts with another key
    /// must come before it.
    pub fn with_table<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if pairs.is_empty() {
            return Ok(Self::literal(Pattern::new("$")?, ""));
        }

        let mut source = String::from("(?>");
        for (i, (key, _)) in pairs.iter().enumerate() {
            if i > 0 {
                source.push('|');
            }
            quote(key, &mut source);
        }
        source.push(')');

        Ok(Self::with_substitution(
            Pattern::new(&source)?,
            TableSubstitution::new(pairs),
        ))
    }

    /// The pattern whose matches are replaced.
    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Replaces all the matches in `text`.
    pub fn replace(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        self.replace_into(text, &mut out);
        out
    }

    /// Replaces the first `count` matches in `text`.
    pub fn replace_n(&self, text: &str, count: usize) -> String {
        let mut out = String::with_capacity(text.len());
        let chars: Vec<char> = text.chars().collect();
        let mut matcher = self.pattern.matcher_for_chars(&chars);
        // Writing into a `String` never fails.
        let _ = self.run(&mut matcher, Some(count), &mut out);
        out
    }

    /// Appends `text` to `out` with all the matches replaced. Returns the
    /// number of replaced matches.
    pub fn replace_into(&self, text: &str, out: &mut String) -> usize {
        let chars: Vec<char> = text.chars().collect();
        let mut matcher = self.pattern.matcher_for_chars(&chars);
        self.run(&mut matcher, None, out).unwrap_or_default()
    }

    /// Writes `text` to `writer` with all the matches replaced. Returns the
    /// number of replaced matches.
    pub fn replace_to_writer<W: io::Write>(
        &self,
        text: &str,
        writer: W,
    ) -> Result<usize, Error> {
        let chars: Vec<char> = text.chars().collect();
        let mut matcher = self.pattern.matcher_for_chars(&chars);
        let mut adapter = IoAdapter { inner: writer, error: None };
        match self.run(&mut matcher, None, &mut adapter) {
            Ok(count) => Ok(count),
            Err(_) => Err(adapter
                .error
                .unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::Other, "formatter error")
                })
                .into()),
        }
    }

    /// Replaces the matches found by `matcher`, up to `limit` of them,
    /// writing the result into `out`.
    fn run(
        &self,
        matcher: &mut Matcher<'_>,
        limit: Option<usize>,
        out: &mut dyn fmt::Write,
    ) -> Result<usize, fmt::Error> {
        let mut count = 0;
        let mut copied = 0;
        let mut last_end = None;

        while limit.map_or(true, |limit| count < limit) && matcher.find() {
            let Some(span) = matcher.span(GroupId::Index(0)) else {
                break;
            };
            if span.is_empty() && last_end == Some(span.start) {
                continue;
            }
            write_chars(&matcher.target_chars()[copied..span.start], out)?;
            self.substitution.append(matcher, out)?;
            copied = span.end;
            last_end = Some(span.end);
            count += 1;
        }

        write_chars(&matcher.target_chars()[copied..], out)?;
        Ok(count)
    }
}

impl Debug for Replacer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replacer").field("pattern", &self.pattern).finish()
    }
}

fn write_chars(chars: &[char], out: &mut dyn fmt::Write) -> fmt::Result {
    for c in chars {
        out.write_char(*c)?;
    }
    Ok(())
}

/// Appends `text` to `pattern` escaping every character that could have a
/// special meaning.
fn quote(text: &str, pattern: &mut String) {
    for c in text.chars() {
        if !c.is_alphanumeric() && c != '_' {
            pattern.push('\\');
        }
        pattern.push(c);
    }
}

/// Writes formatted text into an [`io::Write`], keeping the I/O error that
/// made the write fail.
struct IoAdapter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}
