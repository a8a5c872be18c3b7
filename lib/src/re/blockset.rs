/*! Sets of code points used by character classes.

A [`CodePointSet`] covers the range `[0, 0x10000)`, split into 256 blocks of
256 code points each. Most classes found in real patterns only contain
characters below 256, so a set starts in "small" mode, where a single inline
bitmap holds its members. The set switches to "large" mode, where each block
is stored independently, as soon as some member falls beyond the first block
or an operation requires looking at the complement of another set.

In large mode a block can be empty, full, or hold an explicit bitmap. Full
blocks never hold a bitmap, and explicit bitmaps are reference counted, so
blocks copied from one set into another are shared until one of them is
modified.

Every mutating operation returns the change in the number of members, which
is accumulated in the set's weight. The weight is used by the optimizer for
deciding whether a class is selective enough for being used as a scan target.
*/

use std::fmt::{Debug, Display, Formatter, Write};
use std::sync::Arc;

use bitvec::array::BitArray;
use bitvec::order::Lsb0;

/// Number of code points in a block.
pub(crate) const BLOCK_SIZE: usize = 256;

/// Number of blocks in a set.
pub(crate) const BLOCK_COUNT: usize = 256;

/// Number of code points covered by a [`CodePointSet`].
pub const MAX_WEIGHT: u32 = (BLOCK_SIZE * BLOCK_COUNT) as u32;

pub(crate) type Bits = BitArray<[u64; 4], Lsb0>;

#[inline]
fn empty_bits() -> Bits {
    BitArray::new([0; 4])
}

fn complement(bits: &Bits) -> Bits {
    let mut result = bits.clone();
    for word in result.as_raw_mut_slice() {
        *word = !*word;
    }
    result
}

/// `dst = dst | src`, or `dst = dst | !src` if `inverse` is true.
fn union_bits(dst: &mut Bits, src: &Bits, inverse: bool) {
    for (d, s) in dst.as_raw_mut_slice().iter_mut().zip(src.as_raw_slice()) {
        *d |= if inverse { !*s } else { *s };
    }
}

/// `dst = dst & !src`, or `dst = dst & src` if `inverse` is true.
fn subtract_bits(dst: &mut Bits, src: &Bits, inverse: bool) {
    for (d, s) in dst.as_raw_mut_slice().iter_mut().zip(src.as_raw_slice()) {
        *d &= if inverse { *s } else { !*s };
    }
}

/// One block of 256 code points.
#[derive(Clone, Debug, Default)]
pub(crate) enum Block {
    #[default]
    Empty,
    Full,
    Bits(Arc<Bits>),
}

/// What a block looks like after applying an optional inversion.
enum Operand<'a> {
    Empty,
    Full,
    Bits(&'a Arc<Bits>, bool),
}

impl Block {
    fn from_bits(bits: &Bits) -> Self {
        match bits.count_ones() {
            0 => Block::Empty,
            BLOCK_SIZE => Block::Full,
            _ => Block::Bits(Arc::new(bits.clone())),
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Block::Empty => 0,
            Block::Full => BLOCK_SIZE as u32,
            Block::Bits(bits) => bits.count_ones() as u32,
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Block::Empty => false,
            Block::Full => true,
            Block::Bits(bits) => bits[index],
        }
    }

    fn operand(&self, inverse: bool) -> Operand<'_> {
        match (self, inverse) {
            (Block::Empty, false) | (Block::Full, true) => Operand::Empty,
            (Block::Empty, true) | (Block::Full, false) => Operand::Full,
            (Block::Bits(bits), inverse) => Operand::Bits(bits, inverse),
        }
    }

    /// Blocks with no bits set become [`Block::Empty`], and blocks with all
    /// bits set become [`Block::Full`].
    fn normalize(&mut self) {
        if let Block::Bits(bits) = self {
            match bits.count_ones() {
                0 => *self = Block::Empty,
                BLOCK_SIZE => *self = Block::Full,
                _ => {}
            }
        }
    }

    fn insert(&mut self, index: usize) -> i32 {
        match self {
            Block::Full => return 0,
            Block::Empty => {
                let mut bits = empty_bits();
                bits.set(index, true);
                *self = Block::Bits(Arc::new(bits));
            }
            Block::Bits(bits) => {
                if bits[index] {
                    return 0;
                }
                Arc::make_mut(bits).set(index, true);
            }
        }
        self.normalize();
        1
    }

    /// Adds the members of `other` (or of its complement if `inverse` is
    /// true) to this block. Returns the change in the number of members.
    pub fn add(&mut self, other: &Block, inverse: bool) -> i32 {
        if matches!(self, Block::Full) {
            return 0;
        }
        let before = self.count() as i32;
        match other.operand(inverse) {
            Operand::Empty => return 0,
            Operand::Full => *self = Block::Full,
            Operand::Bits(bits, inverse) => match self {
                Block::Empty if inverse => {
                    *self = Block::Bits(Arc::new(complement(bits)))
                }
                Block::Empty => *self = Block::Bits(Arc::clone(bits)),
                Block::Bits(mine) => {
                    union_bits(Arc::make_mut(mine), bits, inverse)
                }
                Block::Full => unreachable!(),
            },
        }
        self.normalize();
        self.count() as i32 - before
    }

    /// Removes the members of `other` (or of its complement if `inverse` is
    /// true) from this block. Returns the change in the number of members.
    pub fn subtract(&mut self, other: &Block, inverse: bool) -> i32 {
        if matches!(self, Block::Empty) {
            return 0;
        }
        let before = self.count() as i32;
        match other.operand(inverse) {
            Operand::Empty => return 0,
            Operand::Full => *self = Block::Empty,
            Operand::Bits(bits, inverse) => match self {
                Block::Full if inverse => {
                    *self = Block::Bits(Arc::clone(bits))
                }
                Block::Full => *self = Block::Bits(Arc::new(complement(bits))),
                Block::Bits(mine) => {
                    subtract_bits(Arc::make_mut(mine), bits, inverse)
                }
                Block::Empty => unreachable!(),
            },
        }
        self.normalize();
        self.count() as i32 - before
    }
}

/// A set of code points in the range `[0, 0x10000)`.
///
/// The set carries a `positive` flag. When the flag is false the set
/// represents the complement of its members, which is how negated classes
/// like `[^a-z]` are represented without materializing the complement.
/// [`CodePointSet::add`], [`CodePointSet::subtract`] and
/// [`CodePointSet::intersect`] operate on the members as stored, but they
/// honor the `positive` flag of the other operand.
#[derive(Clone)]
pub struct CodePointSet {
    positive: bool,
    count: u32,
    block0: Bits,
    blocks: Vec<Block>,
}

impl Default for CodePointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CodePointSet {
    /// Creates an empty, positive set.
    pub fn new() -> Self {
        Self {
            positive: true,
            count: 0,
            block0: empty_bits(),
            blocks: Vec::new(),
        }
    }

    /// Creates a positive set from a list of inclusive ranges.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        let mut set = Self::new();
        for (lo, hi) in ranges {
            set.insert_range(lo, hi);
        }
        set
    }

    /// True if some member lives outside the first block.
    #[inline]
    pub fn is_large(&self) -> bool {
        !self.blocks.is_empty()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn set_positive(&mut self, positive: bool) {
        self.positive = positive;
    }

    /// Turns the set into its complement.
    pub fn negate(&mut self) {
        self.positive = !self.positive;
    }

    /// Number of code points matched by the set, taking the `positive` flag
    /// into account.
    pub fn weight(&self) -> u32 {
        if self.positive {
            self.count
        } else {
            MAX_WEIGHT - self.count
        }
    }

    /// Returns true if `c` is matched by the set.
    ///
    /// Code points beyond `0xFFFF` are never members, so they are matched
    /// only by negated sets.
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.has_member(c as u32) == self.positive
    }

    /// Returns true if `cp` is stored in the set, ignoring the `positive`
    /// flag.
    #[inline]
    pub(crate) fn has_member(&self, cp: u32) -> bool {
        let cp = cp as usize;
        if self.blocks.is_empty() {
            cp < BLOCK_SIZE && self.block0[cp]
        } else {
            cp < MAX_WEIGHT as usize
                && self.blocks[cp / BLOCK_SIZE].contains(cp % BLOCK_SIZE)
        }
    }

    /// Adds a single code point. Returns the change in weight.
    pub fn insert(&mut self, c: char) -> i32 {
        let cp = c as usize;
        if cp >= MAX_WEIGHT as usize {
            return 0;
        }
        let delta = if cp < BLOCK_SIZE && !self.is_large() {
            if self.block0[cp] {
                0
            } else {
                self.block0.set(cp, true);
                1
            }
        } else {
            self.make_large();
            self.blocks[cp / BLOCK_SIZE].insert(cp % BLOCK_SIZE)
        };
        self.count = (self.count as i32 + delta) as u32;
        delta
    }

    /// Adds all the code points in `lo..=hi`. Returns the change in weight.
    pub fn insert_range(&mut self, lo: char, hi: char) -> i32 {
        let lo = lo as usize;
        let hi = (hi as usize).min(MAX_WEIGHT as usize - 1);
        if lo > hi {
            return 0;
        }
        let mut delta = 0;
        if hi < BLOCK_SIZE && !self.is_large() {
            for cp in lo..=hi {
                if !self.block0[cp] {
                    self.block0.set(cp, true);
                    delta += 1;
                }
            }
        } else {
            self.make_large();
            let mut cp = lo;
            while cp <= hi {
                let block = &mut self.blocks[cp / BLOCK_SIZE];
                let block_end = (cp / BLOCK_SIZE + 1) * BLOCK_SIZE - 1;
                if cp % BLOCK_SIZE == 0 && block_end <= hi {
                    delta += block.add(&Block::Full, false);
                    cp = block_end + 1;
                } else {
                    delta += block.insert(cp % BLOCK_SIZE);
                    cp += 1;
                }
            }
        }
        self.count = (self.count as i32 + delta) as u32;
        delta
    }

    /// Adds the members of `other` to this set. If `inverse` is true, the
    /// complement of `other` is added instead. Returns the change in weight.
    pub fn add(&mut self, other: &CodePointSet, inverse: bool) -> i32 {
        let inverse = inverse != !other.positive;
        let delta = if !inverse && !self.is_large() && !other.is_large() {
            let before = self.block0.count_ones() as i32;
            union_bits(&mut self.block0, &other.block0, false);
            self.block0.count_ones() as i32 - before
        } else {
            self.make_large();
            (0..BLOCK_COUNT)
                .map(|i| self.blocks[i].add(&other.block(i), inverse))
                .sum()
        };
        self.count = (self.count as i32 + delta) as u32;
        delta
    }

    /// Removes the members of `other` from this set. If `inverse` is true,
    /// the members of the complement of `other` are removed instead. Returns
    /// the change in weight.
    pub fn subtract(&mut self, other: &CodePointSet, inverse: bool) -> i32 {
        let inverse = inverse != !other.positive;
        let delta = if !self.is_large() && !other.is_large() {
            let before = self.block0.count_ones() as i32;
            subtract_bits(&mut self.block0, &other.block0, inverse);
            self.block0.count_ones() as i32 - before
        } else {
            self.make_large();
            (0..BLOCK_COUNT)
                .map(|i| self.blocks[i].subtract(&other.block(i), inverse))
                .sum()
        };
        self.count = (self.count as i32 + delta) as u32;
        delta
    }

    /// Keeps only the members that are also in `other` (or in its
    /// complement if `inverse` is true). Returns the change in weight.
    pub fn intersect(&mut self, other: &CodePointSet, inverse: bool) -> i32 {
        self.subtract(other, !inverse)
    }

    /// Iterates over the code points stored in the set, ignoring the
    /// `positive` flag.
    pub fn members(&self) -> impl Iterator<Item = char> + '_ {
        let limit =
            if self.is_large() { MAX_WEIGHT } else { BLOCK_SIZE as u32 };
        (0..limit)
            .filter(|cp| self.has_member(*cp))
            .filter_map(char::from_u32)
    }

    /// Returns the members as a list of inclusive ranges, ignoring the
    /// `positive` flag.
    pub fn ranges(&self) -> Vec<(char, char)> {
        let mut ranges: Vec<(char, char)> = Vec::new();
        for c in self.members() {
            match ranges.last_mut() {
                Some((_, hi)) if *hi as u32 + 1 == c as u32 => *hi = c,
                _ => ranges.push((c, c)),
            }
        }
        ranges
    }

    fn block(&self, index: usize) -> Block {
        if self.is_large() {
            self.blocks[index].clone()
        } else if index == 0 {
            Block::from_bits(&self.block0)
        } else {
            Block::Empty
        }
    }

    fn make_large(&mut self) {
        if self.is_large() {
            return;
        }
        self.blocks = vec![Block::Empty; BLOCK_COUNT];
        self.blocks[0] = Block::from_bits(&self.block0);
        self.block0 = empty_bits();
    }
}

fn write_char(f: &mut Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '\\' | ']' | '[' | '-' | '^' => write!(f, "\\{}", c),
        c if c.is_ascii_graphic() => f.write_char(c),
        c => write!(f, "\\x{{{:x}}}", c as u32),
    }
}

impl Display for CodePointSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('[')?;
        if !self.positive {
            f.write_char('^')?;
        }
        for (lo, hi) in self.ranges() {
            write_char(f, lo)?;
            if hi != lo {
                f.write_char('-')?;
                write_char(f, hi)?;
            }
        }
        f.write_char(']')
    }
}

impl Debug for CodePointSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CodePointSet({}, weight: {})", self, self.weight())
    }
}

impl PartialEq for CodePointSet {
    fn eq(&self, other: &Self) -> bool {
        self.positive == other.positive
            && self.count == other.count
            && self.members().eq(other.members())
    }
}
