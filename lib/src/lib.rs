/*! A backtracking regular expression engine.

Patterns are compiled into a graph of instructions that a backtracking
virtual machine walks over the input text. Besides the usual constructs,
the pattern language supports lookbehind, atomic groups, conditionals,
back-references that ignore case, reverse or mirror the referenced text,
and classes built with set operations.

There are three main types in this crate: [`Pattern`], [`Matcher`] and
[`Replacer`]. A pattern is compiled once and can be shared by any number of
threads. Matchers are created from a pattern for searching a particular
text, and keep the state of the search, which allows enumerating all the
matches one by one. Replacers substitute the matches of a pattern in a
text using Perl-like templates.

# Example

```rust
# use retrace::Pattern;
let pattern = Pattern::new(r"(?<key>\w+)=(?<value>\d+)").unwrap();

let mut matcher = pattern.matcher("a=1 b=22");
assert!(matcher.find());
assert_eq!(matcher.group_by_name("value").unwrap().as_deref(), Some("1"));
assert!(matcher.find());
assert_eq!(matcher.span(0.into()), Some(4..8));

let replaced = pattern.replace_all("a=1 b=22", "${value}:${key}").unwrap();
assert_eq!(replaced, "1:a 22:b");
```
*/

pub use config::Config;

pub use errors::Error;
pub use errors::SyntaxError;

pub use pattern::Pattern;

pub use re::blockset::CodePointSet;
pub use re::matcher::Anchors;
pub use re::matcher::FindAll;
pub use re::matcher::GroupId;
pub use re::matcher::Matcher;
pub use re::Flags;
pub use re::GroupMode;

pub use replace::LiteralSubstitution;
pub use replace::PerlSubstitution;
pub use replace::Replacer;
pub use replace::Substitution;
pub use replace::TableSubstitution;

pub use tokenizer::Tokenizer;

mod config;
mod errors;
mod pattern;
mod re;
mod replace;
mod tokenizer;

#[cfg(test)]
mod tests;
