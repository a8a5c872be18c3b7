/*! Execution of compiled patterns against an input text.

A [`Matcher`] binds a [`Pattern`] to a target text and walks the pattern's
term graph over it with a backtracking virtual machine. The matcher keeps
the state of the last search (the window where the last match was found,
the captured groups and the backtracking stack), which allows calling
[`Matcher::find`] repeatedly for enumerating all matches, or
[`Matcher::proceed`] for enumerating all the ways in which the pattern can
match at a given position.

Positions are measured in characters, relative to the start of the target.
*/

use std::borrow::Cow;
use std::fmt;
use std::fmt::{Display, Formatter, Write};
use std::iter::FusedIterator;
use std::ops::Range;

use bitflags::bitflags;

use crate::errors::Error;
use crate::re::category;
use crate::re::GroupMode;
use crate::Pattern;

use stack::{MemReg, SearchStack};
use vm::Lookaround;

mod stack;
mod vm;


bitflags! {
    /// Options that restrict where a match can be found.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Anchors: u8 {
        /// The match must start at the beginning of the target.
        const START      = 0x01;
        /// The match must start where the previous one ended.
        const LAST_MATCH = 0x02;
        /// The match must end at the end of the target.
        const END        = 0x04;
        /// Reaching the end of the target while the pattern still expects
        /// more characters counts as a match.
        const INCOMPLETE = 0x08;
    }
}

/// Identifies a capture group or one of the pseudo-groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// Text between the start of the target and the start of the match.
    Prefix,
    /// Text between the end of the match and the end of the target.
    Suffix,
    /// The whole target.
    Target,
    /// A capture group. Group 0 is the whole match.
    Index(usize),
}

impl From<usize> for GroupId {
    fn from(index: usize) -> Self {
        GroupId::Index(index)
    }
}

/// Converts the integer ids used by other engines, where the pseudo-groups
/// are `-1` (prefix), `-2` (suffix) and `-3` (target).
impl TryFrom<i32> for GroupId {
    type Error = Error;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        match id {
            -1 => Ok(GroupId::Prefix),
            -2 => Ok(GroupId::Suffix),
            -3 => Ok(GroupId::Target),
            id if id >= 0 => Ok(GroupId::Index(id as usize)),
            id => Err(Error::IllegalGroupId(id)),
        }
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Prefix => write!(f, "prefix"),
            GroupId::Suffix => write!(f, "suffix"),
            GroupId::Target => write!(f, "target"),
            GroupId::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Searches for a [`Pattern`] in a target text.
///
/// Matchers are created with [`Pattern::matcher`], which copies the text,
/// or [`Pattern::matcher_for_chars`], which borrows a slice of characters
/// owned by the caller.
pub struct Matcher<'t> {
    pattern: Pattern,
    data: Cow<'t, [char]>,
    /// Where the next search starts, or where the last match started.
    w_offset: usize,
    /// Where the last match ended.
    w_end: Option<usize>,
    /// True after a search, until the search state is flushed.
    called: bool,
    /// True if the last search found a match.
    matched: bool,
    memregs: Vec<MemReg>,
    counters: Vec<usize>,
    lookarounds: Vec<Lookaround>,
    stack: SearchStack,
}

impl<'t> Matcher<'t> {
    pub(crate) fn new(pattern: Pattern, data: Cow<'t, [char]>) -> Self {
        let program = pattern.program();
        let memregs = vec![MemReg::default(); program.group_count];
        let counters = vec![0; program.counter_count];
        let lookarounds =
            vec![Lookaround::default(); program.lookaround_count];
        Self {
            pattern,
            data,
            w_offset: 0,
            w_end: None,
            called: false,
            matched: false,
            memregs,
            counters,
            lookarounds,
            stack: SearchStack::new(),
        }
    }

    /// The pattern this matcher searches for.
    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Replaces the target with a copy of `text` and resets the search
    /// state.
    pub fn set_target(&mut self, text: &str) {
        self.data = Cow::Owned(text.chars().collect());
        self.set_position(0);
    }

    /// Replaces the target with a slice of characters owned by the caller
    /// and resets the search state.
    pub fn set_target_chars(&mut self, chars: &'t [char]) {
        self.data = Cow::Borrowed(chars);
        self.set_position(0);
    }

    /// Returns the target as a string.
    pub fn target(&self) -> String {
        self.data.iter().collect()
    }

    /// Returns the characters in the target.
    #[inline]
    pub fn target_chars(&self) -> &[char] {
        &self.data
    }

    /// Returns true if the whole target matches the pattern.
    pub fn matches(&mut self) -> bool {
        if self.called {
            self.set_position(0);
        }
        self.search(Anchors::START | Anchors::END)
    }

    /// Returns true if the target matches the pattern or is the beginning
    /// of some text that matches the pattern. With pattern `abcd`, the
    /// targets `""`, `"ab"` and `"abcd"` return true, while `"b"` and
    /// `"abcde"` return false.
    pub fn matches_prefix(&mut self) -> bool {
        self.set_position(0);
        self.search(Anchors::START | Anchors::INCOMPLETE | Anchors::END)
    }

    /// Searches for the next match, starting where the previous one ended.
    pub fn find(&mut self) -> bool {
        self.find_anchored(Anchors::empty())
    }

    /// Like [`Matcher::find`], but the match must satisfy the given
    /// anchors.
    pub fn find_anchored(&mut self, anchors: Anchors) -> bool {
        if self.called {
            self.skip();
        }
        self.search(anchors)
    }

    /// Continues the last search where it left off. While [`Matcher::find`]
    /// looks for the next match after the end of the current one, this
    /// function finds the other ways in which the pattern can match. For
    /// instance, with pattern `\w+` and target `"abc"` successive calls
    /// find `abc`, `ab`, `a`, `bc`, `b` and `c`.
    pub fn proceed(&mut self) -> bool {
        if self.called && self.stack.is_empty() {
            self.w_offset += 1;
        }
        self.search(Anchors::empty())
    }

    /// Moves the search position to the end of the last match. If the last
    /// match was empty, the position advances by one, unless the pattern
    /// can still match differently at the same position.
    pub fn skip(&mut self) {
        match self.w_end {
            Some(w_end) if w_end == self.w_offset => {
                if self.stack.is_empty() {
                    self.w_offset += 1;
                    self.flush();
                }
                return;
            }
            Some(w_end) => self.w_offset = w_end,
            None => self.w_offset = 0,
        }
        self.flush();
    }

    /// Forgets the captured groups and the pending alternatives of the last
    /// search, without moving the search position.
    pub fn flush(&mut self) {
        self.stack.clear();
        self.memregs.fill(MemReg::default());
        self.counters.fill(0);
        self.called = false;
        self.matched = false;
    }

    /// Sets the position where the next search starts.
    pub fn set_position(&mut self, position: usize) {
        self.w_offset = position;
        self.w_end = None;
        self.flush();
    }

    /// Returns an iterator over the spans of the matches found by calling
    /// [`Matcher::find`] repeatedly.
    pub fn find_all(&mut self) -> FindAll<'_, 't> {
        FindAll { matcher: self }
    }

    /// Finds all the remaining matches and returns how many were found.
    pub fn count(&mut self) -> usize {
        self.find_all().count()
    }

    /// Finds all the remaining matches and returns their text.
    pub fn found_strings(&mut self) -> Vec<String> {
        let mut found = Vec::new();
        while self.find() {
            found.extend(self.group(0));
        }
        found
    }

    /// Number of capture groups in the pattern, including group 0.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.memregs.len()
    }

    /// Returns the span of a group or pseudo-group in the last match, or
    /// `None` if there is no match or the group didn't participate in it.
    pub fn span(&self, id: GroupId) -> Option<Range<usize>> {
        let (start, end) = self.bounds(id)?;
        Some(start..end)
    }

    /// Start of a group in the last match.
    pub fn start(&self, group: usize) -> Option<usize> {
        self.bounds(GroupId::Index(group)).map(|(start, _)| start)
    }

    /// End of a group in the last match.
    pub fn end(&self, group: usize) -> Option<usize> {
        self.bounds(GroupId::Index(group)).map(|(_, end)| end)
    }

    /// Text captured by a group in the last match.
    pub fn group(&self, group: usize) -> Option<String> {
        self.get_group(GroupId::Index(group), GroupMode::empty())
    }

    /// Returns true if the group participated in the last match. A group
    /// that didn't participate is different from a group that captured an
    /// empty string.
    pub fn is_captured(&self, group: usize) -> bool {
        self.bounds(GroupId::Index(group)).is_some()
    }

    pub fn start_of(&self, name: &str) -> Result<Option<usize>, Error> {
        Ok(self.start(self.group_index(name)?))
    }

    pub fn end_of(&self, name: &str) -> Result<Option<usize>, Error> {
        Ok(self.end(self.group_index(name)?))
    }

    pub fn group_by_name(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.group(self.group_index(name)?))
    }

    pub fn is_captured_by_name(&self, name: &str) -> Result<bool, Error> {
        Ok(self.is_captured(self.group_index(name)?))
    }

    /// Text between the start of the target and the start of the last
    /// match.
    pub fn prefix(&self) -> Option<String> {
        self.get_group(GroupId::Prefix, GroupMode::empty())
    }

    /// Text between the end of the last match and the end of the target.
    pub fn suffix(&self) -> Option<String> {
        self.get_group(GroupId::Suffix, GroupMode::empty())
    }

    /// Returns the character at `index` within a group.
    pub fn char_at(&self, id: GroupId, index: usize) -> Result<char, Error> {
        let (start, end) = self.bounds(id).ok_or(Error::Unassigned(id))?;
        if index >= end - start {
            return Err(Error::OutOfBounds { index, len: end - start });
        }
        Ok(self.data[start + index])
    }

    /// Returns the text of a group transformed according to `mode`.
    pub fn get_group(&self, id: GroupId, mode: GroupMode) -> Option<String> {
        let mut text = String::new();
        match self.write_group(id, mode, &mut text) {
            Ok(true) => Some(text),
            _ => None,
        }
    }

    /// Writes the text of a group, transformed according to `mode`.
    /// Returns false, without writing anything, if the group didn't
    /// participate in the last match.
    pub(crate) fn write_group<W: Write + ?Sized>(
        &self,
        id: GroupId,
        mode: GroupMode,
        out: &mut W,
    ) -> Result<bool, fmt::Error> {
        let Some((start, end)) = self.bounds(id) else {
            return Ok(false);
        };
        let chars = &self.data[start..end];
        if mode.is_empty() {
            for c in chars {
                out.write_char(*c)?;
            }
            return Ok(true);
        }
        let transform = |c: char| {
            let c = if mode.contains(GroupMode::IGNORE_CASE) {
                category::fold(c)
            } else {
                c
            };
            if mode.contains(GroupMode::BRACKET) {
                category::mirror_bracket(c)
            } else {
                c
            }
        };
        if mode.contains(GroupMode::REVERSE) {
            for c in chars.iter().rev() {
                out.write_char(transform(*c))?;
            }
        } else {
            for c in chars {
                out.write_char(transform(*c))?;
            }
        }
        Ok(true)
    }

    fn group_index(&self, name: &str) -> Result<usize, Error> {
        self.pattern
            .group_id(name)
            .ok_or_else(|| Error::UnknownGroup(name.to_string()))
    }

    fn bounds(&self, id: GroupId) -> Option<(usize, usize)> {
        let len = self.data.len();
        if let GroupId::Target = id {
            return Some((0, len));
        }
        if !self.matched {
            return None;
        }
        match id {
            GroupId::Prefix => Some((0, self.w_offset)),
            GroupId::Suffix => self.w_end.map(|end| (end, len)),
            GroupId::Target => Some((0, len)),
            GroupId::Index(index) => self.memregs.get(index)?.span,
        }
    }
}

/// Iterator returned by [`Matcher::find_all`].
pub struct FindAll<'m, 't> {
    matcher: &'m mut Matcher<'t>,
}

impl Iterator for FindAll<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.matcher.find() {
            self.matcher.span(GroupId::Index(0))
        } else {
            None
        }
    }
}

impl FusedIterator for FindAll<'_, '_> {}
