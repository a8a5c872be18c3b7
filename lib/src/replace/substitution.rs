use std::fmt;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::errors::{Error, SyntaxError};
use crate::re::matcher::{GroupId, Matcher};
use crate::re::{Flags, GroupMode};
use crate::Pattern;

/// Produces the text that replaces a match.
pub trait Substitution: Send + Sync {
    /// Appends the replacement for the last match found by `matcher` to
    /// `out`.
    fn append(
        &self,
        matcher: &Matcher<'_>,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result;
}

lazy_static! {
    /// Recognizes references in Perl-like templates:
    ///
    /// * `$1`, `$&`: group by number, `$&` is the whole match.
    /// * `${name}`, `${12}`: group by name or number.
    /// * `${@/:name}`: same as above, with modes applied to the text.
    /// * `$\X` and `\X`: the character `X`.
    static ref REFERENCE: Result<Pattern, SyntaxError> =
        Pattern::with_flags(
            concat!(
                r"\$(?:\{({mode}\p{Po}+)?({name}\w+)\}",
                r"|({=name}\d+|&)|\\({esc}.))",
                r"|\\({=esc}.)",
            ),
            Flags::UNICODE | Flags::DOTALL,
        );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Text(String),
    Group { index: usize, mode: GroupMode },
}

/// A substitution built from a template where `$n`, `$&` and `${name}`
/// stand for the text captured by a group.
///
/// Within braces the group name can be preceded by mode characters, which
/// transform the captured text: `@` folds its case, `/` reverses it and
/// `:` replaces brackets with their mirrored counterparts. For instance,
/// `${/:x}` is the text captured by group `x`, reversed and with `(`
/// turned into `)`. A mode character that appears twice cancels itself.
///
/// Groups that didn't participate in the match, and numbers that don't
/// correspond to any group, produce no text.
#[derive(Debug, Clone)]
pub struct PerlSubstitution {
    elements: Vec<Element>,
}

impl PerlSubstitution {
    /// Parses `template`, resolving the group names it references through
    /// `pattern`.
    pub fn new(template: &str, pattern: &Pattern) -> Result<Self, Error> {
        let reference = REFERENCE.as_ref().map_err(|err| err.clone())?;
        let chars: Vec<char> = template.chars().collect();
        let mut matcher = reference.matcher_for_chars(&chars);

        let name_id = group(reference, "name");
        let mode_id = group(reference, "mode");
        let esc_id = group(reference, "esc");

        let mut elements = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        while matcher.find() {
            // Every match of the reference pattern is non-empty.
            let Some(span) = matcher.span(GroupId::Index(0)) else {
                break;
            };
            text.extend(&chars[last..span.start]);
            last = span.end;

            if let Some(esc) = matcher.group(esc_id) {
                text.push_str(&esc);
                continue;
            }

            let name = matcher.group(name_id).unwrap_or_default();
            let mode = matcher
                .group(mode_id)
                .unwrap_or_default()
                .chars()
                .fold(GroupMode::empty(), |mode, c| {
                    mode ^ GroupMode::from_char(c)
                });

            let index = if name == "&" {
                0
            } else if name.starts_with(|c: char| c.is_ascii_digit()) {
                // Numbers too large for any pattern can't be captured.
                name.parse().unwrap_or(usize::MAX)
            } else {
                pattern
                    .group_id(&name)
                    .ok_or_else(|| Error::UnknownGroup(name.clone()))?
            };

            if !text.is_empty() {
                elements.push(Element::Text(std::mem::take(&mut text)));
            }
            elements.push(Element::Group { index, mode });
        }

        text.extend(&chars[last..]);
        if !text.is_empty() {
            elements.push(Element::Text(text));
        }

        Ok(Self { elements })
    }
}

impl Substitution for PerlSubstitution {
    fn append(
        &self,
        matcher: &Matcher<'_>,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        for element in &self.elements {
            match element {
                Element::Text(text) => out.write_str(text)?,
                Element::Group { index, mode } => {
                    matcher.write_group(
                        GroupId::Index(*index),
                        *mode,
                        out,
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn group(pattern: &Pattern, name: &str) -> usize {
    match pattern.group_id(name) {
        Some(index) => index,
        None => unreachable!("group `{}` not declared", name),
    }
}

/// A substitution that replaces every match with the same text.
#[derive(Debug, Clone, Default)]
pub struct LiteralSubstitution {
    text: String,
}

impl LiteralSubstitution {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self { text: text.into() }
    }
}

impl Substitution for LiteralSubstitution {
    fn append(
        &self,
        _matcher: &Matcher<'_>,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        out.write_str(&self.text)
    }
}

/// A substitution that looks up the matched text in a table, and replaces
/// it with the corresponding value. Matches that are not in the table are
/// left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TableSubstitution {
    table: FxHashMap<String, String>,
}

impl TableSubstitution {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Substitution for TableSubstitution {
    fn append(
        &self,
        matcher: &Matcher<'_>,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        let Some(matched) = matcher.group(0) else {
            return Ok(());
        };
        match self.table.get(&matched) {
            Some(value) => out.write_str(value),
            None => out.write_str(&matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Element, PerlSubstitution};
    use crate::errors::Error;
    use crate::re::GroupMode;
    use crate::Pattern;

    fn elements(template: &str, pattern: &str) -> Vec<Element> {
        let pattern = Pattern::new(pattern).unwrap();
        PerlSubstitution::new(template, &pattern).unwrap().elements
    }

    #[test]
    fn parse_template() {
        assert_eq!(
            elements("<$1|$&>", "(a)"),
            vec![
                Element::Text("<".to_string()),
                Element::Group { index: 1, mode: GroupMode::empty() },
                Element::Text("|".to_string()),
                Element::Group { index: 0, mode: GroupMode::empty() },
                Element::Text(">".to_string()),
            ]
        );

        assert_eq!(
            elements("${@/x}${//x}", "({x}a)"),
            vec![
                Element::Group {
                    index: 1,
                    mode: GroupMode::IGNORE_CASE | GroupMode::REVERSE
                },
                Element::Group { index: 1, mode: GroupMode::empty() },
            ]
        );

        assert_eq!(
            elements(r"\$1 costs $\$5", "(a)"),
            vec![Element::Text("$1 costs $5".to_string())]
        );

        assert_eq!(elements("", "a"), vec![]);
    }

    #[test]
    fn unknown_name() {
        let pattern = Pattern::new("(?<x>a)").unwrap();
        assert!(matches!(
            PerlSubstitution::new("${y}", &pattern),
            Err(Error::UnknownGroup(name)) if name == "y"
        ));
    }
}
