use smallvec::SmallVec;

use crate::re::program::TermId;

/// Capture state of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MemReg {
    /// Start and end of the last capture, if any.
    pub span: Option<(usize, usize)>,
    /// Position recorded by the last `GROUP_IN`, which becomes the start
    /// of the capture when the group is closed.
    pub tmp: Option<usize>,
}

/// Changes done to groups and counters, recorded so that they can be
/// undone. Each entry is the index of the group (or counter) and the value
/// it had before the change.
#[derive(Debug, Default)]
struct Changes {
    groups: SmallVec<[(usize, MemReg); 2]>,
    counters: SmallVec<[(usize, usize); 2]>,
}

impl Changes {
    fn clear(&mut self) {
        self.groups.clear();
        self.counters.clear();
    }

    /// Undoes the changes in the opposite order they were recorded.
    fn undo(&mut self, memregs: &mut [MemReg], counters: &mut [usize]) {
        for (index, old) in self.groups.drain(..).rev() {
            memregs[index] = old;
        }
        for (index, old) in self.counters.drain(..).rev() {
            counters[index] = old;
        }
    }

    fn append(&mut self, other: &mut Changes) {
        self.groups.extend(other.groups.drain(..));
        self.counters.extend(other.counters.drain(..));
    }
}

/// An entry in the backtracking stack.
#[derive(Debug)]
struct SearchEntry {
    term: TermId,
    index: usize,
    cnt: usize,
    reg_len: usize,
    /// Changes done after this entry was pushed and before the next one.
    changes: Changes,
}

/// What the matcher needs for resuming the search at a popped entry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resume {
    pub term: TermId,
    pub index: usize,
    pub cnt: usize,
    pub reg_len: usize,
}

/// The backtracking stack.
///
/// Entries above `top` are kept allocated after being popped, so the stack
/// doesn't allocate memory once it has grown to the depth required by the
/// pattern. Every change to groups and counters is recorded in the entry at
/// the top of the stack, or in `base` if the stack is empty. Popping an
/// entry undoes the changes recorded in it, which returns groups and
/// counters to the state they had when the entry was pushed.
#[derive(Debug, Default)]
pub(crate) struct SearchStack {
    entries: Vec<SearchEntry>,
    top: usize,
    base: Changes,
}

impl SearchStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn push(
        &mut self,
        term: TermId,
        index: usize,
        cnt: usize,
        reg_len: usize,
    ) {
        if let Some(entry) = self.entries.get_mut(self.top) {
            entry.term = term;
            entry.index = index;
            entry.cnt = cnt;
            entry.reg_len = reg_len;
            entry.changes.clear();
        } else {
            self.entries.push(SearchEntry {
                term,
                index,
                cnt,
                reg_len,
                changes: Changes::default(),
            });
        }
        self.top += 1;
    }

    /// Pops the entry at the top of the stack, undoing the changes recorded
    /// in it.
    pub fn pop(
        &mut self,
        memregs: &mut [MemReg],
        counters: &mut [usize],
    ) -> Option<Resume> {
        if self.top == 0 {
            return None;
        }
        self.top -= 1;
        let entry = &mut self.entries[self.top];
        entry.changes.undo(memregs, counters);
        Some(Resume {
            term: entry.term,
            index: entry.index,
            cnt: entry.cnt,
            reg_len: entry.reg_len,
        })
    }

    /// Drops the entries above `top` without undoing their changes. The
    /// changes are moved to the entry that becomes the top of the stack, so
    /// that they are undone when that entry is popped.
    pub fn truncate(&mut self, top: usize) {
        if top >= self.top {
            return;
        }
        let (below, above) = self.entries.split_at_mut(top);
        let target = match below.last_mut() {
            Some(entry) => &mut entry.changes,
            None => &mut self.base,
        };
        for entry in &mut above[..self.top - top] {
            target.append(&mut entry.changes);
        }
        self.top = top;
    }

    fn changes(&mut self) -> &mut Changes {
        match self.top {
            0 => &mut self.base,
            top => &mut self.entries[top - 1].changes,
        }
    }

    pub fn save_group(&mut self, index: usize, old: MemReg) {
        self.changes().groups.push((index, old));
    }

    pub fn save_counter(&mut self, index: usize, old: usize) {
        self.changes().counters.push((index, old));
    }

    /// Undoes the changes done while the stack was empty.
    pub fn restore_base(
        &mut self,
        memregs: &mut [MemReg],
        counters: &mut [usize],
    ) {
        self.base.undo(memregs, counters);
    }

    /// Forgets all the entries and recorded changes.
    pub fn clear(&mut self) {
        self.top = 0;
        self.base.clear();
    }
}
