use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[cfg(feature = "logging")]
use log::*;
#[cfg(feature = "logging")]
use std::time::Instant;

use crate::config::Config;
use crate::errors::{Error, SyntaxError};
use crate::re::compiler::Compiler;
use crate::re::matcher::Matcher;
use crate::re::optimizer;
use crate::re::parser::Parser;
use crate::re::program::Program;
use crate::re::Flags;
use crate::replace::Replacer;
use crate::tokenizer::Tokenizer;

/// A compiled regular expression.
///
/// Compiling a pattern is relatively expensive, so patterns are meant to be
/// compiled once and used many times. A pattern is immutable, and cloning
/// it is cheap, as clones share the compiled program. Patterns can be sent
/// to other threads, while the [`Matcher`]s created from them are meant to
/// be used by a single thread at a time.
#[derive(Clone)]
pub struct Pattern {
    inner: Arc<Inner>,
}

struct Inner {
    source: String,
    flags: Flags,
    program: Program,
}

impl Pattern {
    /// Compiles a pattern with the default flags and configuration.
    pub fn new(pattern: &str) -> Result<Self, SyntaxError> {
        Self::with_flags(pattern, Flags::empty())
    }

    /// Compiles a pattern with the given flags.
    pub fn with_flags(
        pattern: &str,
        flags: Flags,
    ) -> Result<Self, SyntaxError> {
        Self::with_config(pattern, flags, &Config::default())
    }

    /// Compiles a pattern with the given flags and configuration.
    pub fn with_config(
        pattern: &str,
        flags: Flags,
        config: &Config,
    ) -> Result<Self, SyntaxError> {
        #[cfg(feature = "logging")]
        let start = Instant::now();

        let parsed = Parser::new().flags(flags).parse(pattern)?;
        let mut program = Compiler::new().compile(parsed);

        if config.optimize {
            program = optimizer::optimize(program, config.scan_threshold);
        }

        #[cfg(feature = "logging")]
        info!(
            "pattern {:?} compiled into {} terms in {:?}",
            pattern,
            program.terms.len(),
            Instant::elapsed(&start)
        );

        Ok(Self {
            inner: Arc::new(Inner {
                source: pattern.to_string(),
                flags,
                program,
            }),
        })
    }

    /// The text the pattern was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.inner.source.as_str()
    }

    /// The flags the pattern was compiled with. Flags changed within the
    /// pattern by inline groups are not reflected here.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.inner.flags
    }

    /// Number of capture groups, including group 0, which is the whole
    /// match.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.inner.program.group_count
    }

    /// Returns the index of a named group.
    pub fn group_id(&self, name: &str) -> Option<usize> {
        self.inner.program.names.get(name).copied()
    }

    /// Creates a matcher that searches a copy of `text`.
    pub fn matcher(&self, text: &str) -> Matcher<'static> {
        Matcher::new(self.clone(), Cow::Owned(text.chars().collect()))
    }

    /// Creates a matcher that searches a slice of characters owned by the
    /// caller.
    pub fn matcher_for_chars<'t>(&self, chars: &'t [char]) -> Matcher<'t> {
        Matcher::new(self.clone(), Cow::Borrowed(chars))
    }

    /// Returns true if the whole `text` matches the pattern.
    pub fn matches(&self, text: &str) -> bool {
        self.matcher(text).matches()
    }

    /// Returns true if `text` matches the pattern or is the beginning of a
    /// text that would match it.
    pub fn starts_with(&self, text: &str) -> bool {
        self.matcher(text).matches_prefix()
    }

    /// Splits `text` at the matches of the pattern. Empty tokens are
    /// skipped.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.tokenizer(text).collect()
    }

    /// Returns an iterator over the pieces of `text` between the matches
    /// of the pattern.
    pub fn tokenizer(&self, text: &str) -> Tokenizer<'static> {
        Tokenizer::new(self.matcher(text))
    }

    /// Creates a [`Replacer`] that replaces the matches of this pattern
    /// using a Perl-like template, where `$1` or `${name}` stand for the
    /// text captured by a group.
    pub fn replacer(&self, template: &str) -> Result<Replacer, Error> {
        Replacer::new(self.clone(), template)
    }

    /// Replaces the first match of the pattern in `text`.
    pub fn replace_first(
        &self,
        text: &str,
        template: &str,
    ) -> Result<String, Error> {
        Ok(self.replacer(template)?.replace_n(text, 1))
    }

    /// Replaces all the matches of the pattern in `text`.
    pub fn replace_all(
        &self,
        text: &str,
        template: &str,
    ) -> Result<String, Error> {
        Ok(self.replacer(template)?.replace(text))
    }

    #[inline]
    pub(crate) fn program(&self) -> &Program {
        &self.inner.program
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.inner.source)
            .field("flags", &self.inner.flags)
            .finish()
    }
}

/// Shows the graph of terms the pattern was compiled into.
impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.program)
    }
}
