/*! The backtracking virtual machine.

The search is a loop over candidate start positions. At each position the
machine walks the term graph, advancing the input position as terms match.
Terms that offer alternatives push an entry into the backtracking stack
before continuing. When a term fails, the entry at the top of the stack is
popped, the groups and counters modified since it was pushed are restored,
and the walk resumes at the term and position recorded in the entry. When
the stack is empty the attempt at the current position has failed, and the
search moves to the next position.
*/

use std::mem;

use crate::re::category;
use crate::re::is_line_terminator;
use crate::re::matcher::{Anchors, Matcher};
use crate::re::program::{Term, TermId, TermKind};
use crate::re::GroupMode;

/// Evaluates a condition. When the condition holds the walk continues with
/// `next`, when it doesn't it continues with `fail_next`, or fails if the
/// term doesn't have one.
macro_rules! check {
    ($term:expr, $holds:expr, $label:lifetime) => {
        match ($holds, $term.fail_next) {
            (true, _) => next($term),
            (false, Some(fail)) => fail,
            (false, None) => break $label,
        }
    };
}

/// State saved when entering a lookaround assertion or an atomic group.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Lookaround {
    /// Input position at the entry point.
    index: usize,
    /// Height of the backtracking stack at the entry point.
    top: usize,
}

impl<'t> Matcher<'t> {
    /// Runs a search starting at the current position, or resumes the last
    /// one if its backtracking stack still has pending alternatives.
    pub(super) fn search(&mut self, anchors: Anchors) -> bool {
        self.called = true;
        let data = mem::take(&mut self.data);
        let found = self.run(&data, anchors);
        self.data = data;
        found
    }

    fn run(&mut self, data: &[char], anchors: Anchors) -> bool {
        let pattern = self.pattern.clone();
        let program = pattern.program();

        let end = data.len();
        let match_end = anchors.contains(Anchors::END);
        let allow_incomplete = anchors.contains(Anchors::INCOMPLETE);
        let anchored =
            anchors.intersects(Anchors::START | Anchors::LAST_MATCH);
        let last_match_end = self.w_end.unwrap_or(0);

        let mut w_offset = self.w_offset;
        let mut term;
        let mut i;
        let mut cnt;
        let mut reg_len;

        match self.stack.pop(&mut self.memregs, &mut self.counters) {
            Some(resume) => {
                term = resume.term;
                i = resume.index;
                cnt = resume.cnt;
                reg_len = resume.reg_len;
            }
            None => {
                if w_offset > end
                    || anchors.contains(Anchors::START) && w_offset != 0
                    || anchors.contains(Anchors::LAST_MATCH)
                        && w_offset != last_match_end
                {
                    return self.fail(end);
                }
                self.stack.restore_base(&mut self.memregs, &mut self.counters);
                // Scanning skips the positions where a match can't start,
                // but an incomplete search may succeed at any of them.
                term = if anchored || allow_incomplete {
                    program.root0
                } else {
                    program.root
                };
                i = w_offset;
                cnt = 0;
                reg_len = 0;
            }
        }

        loop {
            'walk: loop {
                let id = term;
                let t = &program[id];
                term = match &t.kind {
                    TermKind::Char(_)
                    | TermKind::AnyChar
                    | TermKind::AnyCharNe
                    | TermKind::Class(_) => match data.get(i) {
                        Some(c) if matches_char(&t.kind, *c) => {
                            i += 1;
                            next(t)
                        }
                        _ => break 'walk,
                    },
                    TermKind::Reg { group, mode } => {
                        let Some((start, stop)) = self.captured(*group)
                        else {
                            break 'walk;
                        };
                        if stop > start {
                            if !compare_regions(data, (start, stop), i, *mode)
                            {
                                break 'walk;
                            }
                            i += stop - start;
                        }
                        next(t)
                    }
                    TermKind::Start => check!(t, i == 0, 'walk),
                    TermKind::End => check!(t, i >= end, 'walk),
                    TermKind::EndEol => check!(
                        t,
                        i >= end
                            || i + 1 == end && data[i] == '\n'
                            || i + 2 == end
                                && data[i] == '\r'
                                && data[i + 1] == '\n',
                        'walk
                    ),
                    TermKind::LineStart => check!(
                        t,
                        i == 0 || i < end && is_line_terminator(data[i - 1]),
                        'walk
                    ),
                    TermKind::LineEnd => check!(
                        t,
                        i >= end || is_line_terminator(data[i]),
                        'walk
                    ),
                    TermKind::LastMatchEnd => {
                        check!(t, i == last_match_end, 'walk)
                    }
                    TermKind::Boundary { class, negated } => {
                        let before = i > 0 && class.contains(data[i - 1]);
                        let after = i < end && class.contains(data[i]);
                        check!(t, before ^ after ^ *negated, 'walk)
                    }
                    TermKind::Direction { class, end: at_end } => {
                        let before = i > 0 && class.contains(data[i - 1]);
                        let after = i < end && class.contains(data[i]);
                        let holds = if *at_end {
                            before && !after
                        } else {
                            !before && after
                        };
                        check!(t, holds, 'walk)
                    }
                    TermKind::Void => next(t),
                    TermKind::GroupIn(n) => {
                        let old = self.memregs[*n];
                        self.stack.save_group(*n, old);
                        self.memregs[*n].tmp = Some(i);
                        next(t)
                    }
                    TermKind::GroupOut(n) => {
                        let old = self.memregs[*n];
                        self.stack.save_group(*n, old);
                        self.memregs[*n].span =
                            old.tmp.map(|start| (start, i));
                        next(t)
                    }
                    TermKind::Branch | TermKind::BranchStoreCnt => {
                        self.stack.push(fail_next(t), i, cnt, reg_len);
                        next(t)
                    }
                    TermKind::Repeat0Inf { target } => {
                        let count = repeat(data, i, end, &program[*target]);
                        if count > 0 {
                            i += count;
                            self.stack.push(fail_next(t), i, count, reg_len);
                        }
                        next(t)
                    }
                    TermKind::RepeatMinInf { target, min } => {
                        let count = repeat(data, i, end, &program[*target]);
                        // Advancing before the check lets an incomplete
                        // search succeed if the input ended too early.
                        i += count;
                        if count < *min as usize {
                            break 'walk;
                        }
                        self.stack.push(fail_next(t), i, count, reg_len);
                        next(t)
                    }
                    TermKind::RepeatMinMax { target, min, max } => {
                        let limit = end.min(i + *max as usize);
                        let count = repeat(data, i, limit, &program[*target]);
                        i += count;
                        if count < *min as usize {
                            break 'walk;
                        }
                        self.stack.push(fail_next(t), i, count, reg_len);
                        next(t)
                    }
                    TermKind::RepeatRegMinInf { target, min } => {
                        let (group, mode) = reg(&program[*target]);
                        let Some(sample) = self.captured(group) else {
                            break 'walk;
                        };
                        let len = sample.1 - sample.0;
                        if len > 0 {
                            let mut count = 0;
                            let mut j = i;
                            while compare_regions(data, sample, j, mode) {
                                count += 1;
                                j += len;
                            }
                            if count < *min as usize {
                                break 'walk;
                            }
                            i = j;
                            self.stack.push(fail_next(t), i, count, len);
                        }
                        next(t)
                    }
                    TermKind::RepeatRegMinMax { target, min, max } => {
                        let (group, mode) = reg(&program[*target]);
                        let Some(sample) = self.captured(group) else {
                            break 'walk;
                        };
                        let len = sample.1 - sample.0;
                        if len > 0 {
                            let mut count = 0;
                            let mut j = i;
                            while count < *max as usize
                                && compare_regions(data, sample, j, mode)
                            {
                                count += 1;
                                j += len;
                            }
                            if count < *min as usize {
                                break 'walk;
                            }
                            i = j;
                            self.stack.push(fail_next(t), i, count, len);
                        }
                        next(t)
                    }
                    TermKind::Backtrack0 => {
                        if cnt == 0 {
                            break 'walk;
                        }
                        cnt -= 1;
                        i -= 1;
                        self.stack.push(id, i, cnt, reg_len);
                        next(t)
                    }
                    TermKind::BacktrackMin { min } => {
                        if cnt <= *min as usize {
                            break 'walk;
                        }
                        cnt -= 1;
                        i -= 1;
                        self.stack.push(id, i, cnt, reg_len);
                        next(t)
                    }
                    TermKind::BacktrackRegMin { min } => {
                        if cnt <= *min as usize {
                            break 'walk;
                        }
                        cnt -= 1;
                        i -= reg_len;
                        self.stack.push(id, i, cnt, reg_len);
                        next(t)
                    }
                    TermKind::BacktrackFindMin {
                        target,
                        min,
                        distance,
                        eat,
                    } => {
                        let min = *min as usize;
                        // The repetition can't end where the target would
                        // be past the end of the input.
                        if i + distance > end {
                            let exceed = i + distance - end;
                            if cnt <= min + exceed {
                                break 'walk;
                            }
                            cnt -= exceed;
                            i -= exceed;
                        }
                        if cnt <= min {
                            break 'walk;
                        }
                        let Some(back) = find_back(
                            data,
                            i + distance,
                            cnt - min,
                            &program[*target],
                        ) else {
                            break 'walk;
                        };
                        cnt -= back;
                        i -= back;
                        if cnt > min {
                            self.stack.push(id, i, cnt, reg_len);
                        }
                        if *eat {
                            i += 1;
                        }
                        next(t)
                    }
                    TermKind::BacktrackFindRegMin {
                        target,
                        min,
                        distance,
                        eat,
                    } => {
                        let min = *min as usize;
                        let (group, mode) = reg(&program[*target]);
                        let Some(sample) = self.captured(group) else {
                            break 'walk;
                        };
                        if i + distance > end {
                            let exceed = i + distance - end;
                            if cnt <= min + exceed {
                                break 'walk;
                            }
                            cnt -= exceed;
                            i -= exceed;
                        }
                        if cnt <= min {
                            break 'walk;
                        }
                        let len = sample.1 - sample.0;
                        // An empty group matches anywhere, so characters
                        // are given back one at a time.
                        let back = if len == 0 {
                            1
                        } else {
                            match find_back_reg(
                                data,
                                i + distance,
                                sample,
                                cnt - min,
                                mode,
                            ) {
                                Some(back) => back,
                                None => break 'walk,
                            }
                        };
                        cnt -= back;
                        i -= back;
                        if cnt > min {
                            self.stack.push(id, i, cnt, reg_len);
                        }
                        if *eat {
                            i += len;
                        }
                        next(t)
                    }
                    TermKind::Find { target, distance, eat } => {
                        // No match can start at or after `i` if the target
                        // doesn't appear in the rest of the input.
                        let Some(jump) =
                            find(data, i + distance, &program[*target])
                        else {
                            return self.fail(end);
                        };
                        i += jump;
                        w_offset = i;
                        if *eat {
                            i += 1;
                        }
                        next(t)
                    }
                    TermKind::CntSet0 => {
                        cnt = 0;
                        next(t)
                    }
                    TermKind::CntInc => {
                        cnt += 1;
                        next(t)
                    }
                    TermKind::CntGtEq(min) => {
                        check!(t, cnt >= *min as usize, 'walk)
                    }
                    TermKind::ReadCntLt(max) => check!(
                        t,
                        max.map_or(true, |max| cnt < max as usize),
                        'walk
                    ),
                    TermKind::CrSet0(c) => {
                        self.stack.save_counter(*c, self.counters[*c]);
                        self.counters[*c] = 0;
                        next(t)
                    }
                    TermKind::CrStoreCrInc(c) => {
                        self.stack.save_counter(*c, self.counters[*c]);
                        self.counters[*c] += 1;
                        next(t)
                    }
                    TermKind::CrLt(c, max) => {
                        check!(t, self.counters[*c] < *max as usize, 'walk)
                    }
                    TermKind::CrGtEq(c, min) => {
                        check!(t, self.counters[*c] >= *min as usize, 'walk)
                    }
                    TermKind::PosStore(c) => {
                        self.stack.save_counter(*c, self.counters[*c]);
                        self.counters[*c] = i;
                        next(t)
                    }
                    TermKind::PosCheck(c) => {
                        check!(t, self.counters[*c] != i, 'walk)
                    }
                    TermKind::PLookaheadIn(la)
                    | TermKind::IndependentIn(la) => {
                        self.enter(*la, i);
                        next(t)
                    }
                    TermKind::PLookbehindIn { la, distance } => {
                        if i < *distance {
                            break 'walk;
                        }
                        self.enter(*la, i);
                        i -= distance;
                        next(t)
                    }
                    TermKind::PLookaheadOut(la)
                    | TermKind::PLookbehindOut(la)
                    | TermKind::LookaheadConditionOut(la)
                    | TermKind::LookbehindConditionOut(la) => {
                        i = self.leave(*la);
                        next(t)
                    }
                    TermKind::IndependentOut(la) => {
                        self.leave(*la);
                        next(t)
                    }
                    TermKind::NLookaheadIn(la)
                    | TermKind::LookaheadConditionIn(la) => {
                        self.enter(*la, i);
                        self.stack.push(fail_next(t), i, cnt, reg_len);
                        next(t)
                    }
                    TermKind::NLookbehindIn { la, distance }
                    | TermKind::LookbehindConditionIn { la, distance } => {
                        // There are not enough characters before the
                        // current position, so the body can't match.
                        if i < *distance {
                            fail_next(t)
                        } else {
                            self.enter(*la, i);
                            self.stack.push(fail_next(t), i, cnt, reg_len);
                            i -= distance;
                            next(t)
                        }
                    }
                    TermKind::NLookaheadOut(la)
                    | TermKind::NLookbehindOut(la) => {
                        self.leave(*la);
                        break 'walk;
                    }
                    TermKind::MemregCondition(n) => {
                        check!(t, self.captured(*n).is_some(), 'walk)
                    }
                    TermKind::Success => {
                        if match_end && i != end {
                            break 'walk;
                        }
                        return self.succeed(w_offset, i);
                    }
                };
            }

            // The current path failed.
            if allow_incomplete && i == end {
                return self.succeed(w_offset, i);
            }

            if let Some(resume) =
                self.stack.pop(&mut self.memregs, &mut self.counters)
            {
                term = resume.term;
                i = resume.index;
                cnt = resume.cnt;
                reg_len = resume.reg_len;
                continue;
            }

            // All the alternatives at this position failed.
            if anchored {
                return self.fail(end);
            }
            self.stack.restore_base(&mut self.memregs, &mut self.counters);
            w_offset += 1;
            if w_offset > end {
                return self.fail(end);
            }
            term = if allow_incomplete { program.root0 } else { program.root };
            i = w_offset;
            cnt = 0;
            reg_len = 0;
        }
    }

    fn succeed(&mut self, start: usize, end: usize) -> bool {
        self.memregs[0].span = Some((start, end));
        self.w_offset = start;
        self.w_end = Some(end);
        self.matched = true;
        true
    }

    /// Leaves the matcher in a state where subsequent searches fail too.
    fn fail(&mut self, end: usize) -> bool {
        self.stack.clear();
        self.w_offset = end + 1;
        self.w_end = Some(end + 1);
        self.matched = false;
        false
    }

    #[inline]
    fn captured(&self, group: usize) -> Option<(usize, usize)> {
        self.memregs.get(group)?.span
    }

    #[inline]
    fn enter(&mut self, la: usize, index: usize) {
        self.lookarounds[la] = Lookaround { index, top: self.stack.top() };
    }

    /// Drops the alternatives pushed since the lookaround was entered and
    /// returns the position where it was entered.
    #[inline]
    fn leave(&mut self, la: usize) -> usize {
        let entry = self.lookarounds[la];
        self.stack.truncate(entry.top);
        entry.index
    }
}

#[inline]
fn next(term: &Term) -> TermId {
    match term.next {
        Some(next) => next,
        None => unreachable!("{} doesn't have a successor", term.kind),
    }
}

#[inline]
fn fail_next(term: &Term) -> TermId {
    match term.fail_next {
        Some(next) => next,
        None => unreachable!("{} doesn't have an alternative", term.kind),
    }
}

/// Returns the group and mode of a back-reference term.
#[inline]
fn reg(term: &Term) -> (usize, GroupMode) {
    match term.kind {
        TermKind::Reg { group, mode } => (group, mode),
        _ => unreachable!("{} is not a back-reference", term.kind),
    }
}

#[inline]
fn matches_char(kind: &TermKind, c: char) -> bool {
    match kind {
        TermKind::Char(expected) => *expected == c,
        TermKind::AnyChar => true,
        TermKind::AnyCharNe => c != '\n' && c != '\r',
        TermKind::Class(set) => set.contains(c),
        _ => unreachable!("{} doesn't match single characters", kind),
    }
}

/// Counts how many consecutive characters in `data[from..to]` match the
/// term.
fn repeat(data: &[char], from: usize, to: usize, target: &Term) -> usize {
    data[from..to]
        .iter()
        .take_while(|c| matches_char(&target.kind, **c))
        .count()
}

/// Returns the distance from `from` to the first character that matches
/// the term.
fn find(data: &[char], from: usize, target: &Term) -> Option<usize> {
    data.get(from..)?.iter().position(|c| matches_char(&target.kind, *c))
}

/// Looks for a character that matches the term in the `max` positions
/// preceding `from`, and returns its distance to `from`.
fn find_back(
    data: &[char],
    from: usize,
    max: usize,
    target: &Term,
) -> Option<usize> {
    (1..=max).find(|back| matches_char(&target.kind, data[from - back]))
}

/// Like [`find_back`], but looks for the text captured by a group.
fn find_back_reg(
    data: &[char],
    from: usize,
    sample: (usize, usize),
    max: usize,
    mode: GroupMode,
) -> Option<usize> {
    (1..=max).find(|back| compare_regions(data, sample, from - back, mode))
}

/// Returns true if the text at position `at` is equal to the text in the
/// `sample` range, once the sample is transformed according to `mode`.
fn compare_regions(
    data: &[char],
    sample: (usize, usize),
    at: usize,
    mode: GroupMode,
) -> bool {
    let (start, end) = sample;
    let Some(input) = data.get(at..at + (end - start)) else {
        return false;
    };
    let sample = &data[start..end];
    if mode.is_empty() {
        return sample == input;
    }
    let same = |a: char, b: char| {
        let (a, b) = if mode.contains(GroupMode::IGNORE_CASE) {
            (category::fold(a), category::fold(b))
        } else {
            (a, b)
        };
        if mode.contains(GroupMode::BRACKET) {
            a == category::mirror_bracket(b)
        } else {
            a == b
        }
    };
    if mode.contains(GroupMode::REVERSE) {
        sample.iter().rev().zip(input).all(|(a, b)| same(*a, *b))
    } else {
        sample.iter().zip(input).all(|(a, b)| same(*a, *b))
    }
}
