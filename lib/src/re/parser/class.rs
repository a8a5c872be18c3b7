use crate::errors::SyntaxError;
use crate::re::blockset::CodePointSet;
use crate::re::category;
use crate::re::Flags;

use super::ParserState;

/// An item within a character class.
enum ClassItem {
    Char(char),
    Set(CodePointSet),
}

impl ParserState {
    /// Parses a character class like `[a-z]`, `[^\d\s]` or
    /// `[\w&&[^_]]`. The parser must be positioned at the opening bracket.
    pub(super) fn parse_class(&mut self) -> Result<CodePointSet, SyntaxError> {
        let start = self.pos;
        self.bump();
        self.parse_class_body(start, true)
    }

    /// Parses the items in a class up to, and including, the closing
    /// bracket. Negation with `^` is only accepted when `top` is true, which
    /// means that the body is not the right operand of `&&`.
    fn parse_class_body(
        &mut self,
        start: usize,
        top: bool,
    ) -> Result<CodePointSet, SyntaxError> {
        let negated = top && self.eat('^');
        let xml = self.flags.contains(Flags::XML_SCHEMA);
        let mut set = CodePointSet::new();
        // A closing bracket right after the opening one is a literal.
        let mut first = top;

        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => {
                    return Err(
                        self.error_at("malformed character class", start)
                    )
                }
            };
            match c {
                ']' if !first => {
                    self.bump();
                    break;
                }
                '[' if self.peek_at(1) == Some(':') => {
                    let pos = self.pos;
                    self.pos += 2;
                    let name = self.take_while(|c| c != ':' && c != ']');
                    if !(self.eat(':') && self.eat(']')) {
                        return Err(
                            self.error_at("malformed character class", pos)
                        );
                    }
                    let posix =
                        category::posix_class(&name).ok_or_else(|| {
                            self.error_at(
                                format!("unknown POSIX class: {}", name),
                                pos,
                            )
                        })?;
                    set.add(&posix, false);
                }
                '[' => {
                    let nested = self.parse_class()?;
                    set.add(&nested, false);
                }
                '&' if self.peek_at(1) == Some('&') => {
                    self.pos += 2;
                    let rest = self.parse_class_body(start, false)?;
                    set.intersect(&rest, false);
                    break;
                }
                '-' if xml && self.peek_at(1) == Some('[') => {
                    self.bump();
                    let subtrahend = self.parse_class()?;
                    set.subtract(&subtrahend, false);
                    if !self.eat(']') {
                        return Err(
                            self.error_at("malformed character class", start)
                        );
                    }
                    break;
                }
                _ => {
                    let item_start = self.pos;
                    match self.parse_class_item(start)? {
                        ClassItem::Set(s) => {
                            set.add(&s, false);
                        }
                        ClassItem::Char(lo) if self.is_range_dash(xml) => {
                            self.bump();
                            let hi = match self.parse_class_item(start)? {
                                ClassItem::Char(hi) if hi >= lo => hi,
                                _ => {
                                    return Err(self.error_at(
                                        "illegal character range",
                                        item_start,
                                    ))
                                }
                            };
                            set.insert_range(lo, hi);
                        }
                        ClassItem::Char(c) => {
                            set.insert(c);
                        }
                    }
                }
            }
            first = false;
        }

        if self.flags.contains(Flags::IGNORE_CASE) {
            category::add_case_variants(&mut set);
        }
        if negated {
            set.negate();
        }
        Ok(set)
    }

    /// True if the parser is at a dash that forms a range with the previous
    /// character. A dash right before the closing bracket is a literal, and
    /// so is a dash that starts an XML schema subtraction.
    fn is_range_dash(&self, xml: bool) -> bool {
        self.peek() == Some('-')
            && match self.peek_at(1) {
                None | Some(']') => false,
                Some('[') => !xml,
                Some(_) => true,
            }
    }

    fn parse_class_item(
        &mut self,
        start: usize,
    ) -> Result<ClassItem, SyntaxError> {
        let escape = self.pos;
        match self.bump() {
            None => Err(self.error_at("malformed character class", start)),
            Some('\\') => match self.bump() {
                None => {
                    Err(self.error_at("escape without a character", escape))
                }
                Some(
                    c @ ('d' | 'D' | 'w' | 'W' | 's' | 'S' | 'h' | 'H' | 'v'
                    | 'V'),
                ) => Ok(ClassItem::Set(self.perl_class(c))),
                Some(c @ ('p' | 'P')) => {
                    Ok(ClassItem::Set(self.parse_property(c == 'P', escape)?))
                }
                Some('b') => Ok(ClassItem::Char('\x08')),
                Some(c) => Ok(ClassItem::Char(self.escaped_char(c, escape)?)),
            },
            Some(c) => Ok(ClassItem::Char(c)),
        }
    }
}
