//! Packed bit strings used for both trie edge labels and lookup keys.
//!
//! Bits are stored MSB-first in `u64` words: bit `0` of the string is bit 63
//! of `words[0]`. Bits past `len` are always zero, so two strings with the
//! same bits compare equal regardless of how they were built.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::ParseBitsError;

const WORD_BITS: usize = 64;

#[inline]
fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

/// Mask keeping the first `n` (1..=64) bits of a word.
#[inline]
fn high_mask(n: usize) -> u64 {
    debug_assert!((1..=WORD_BITS).contains(&n));
    !0u64 << (WORD_BITS - n)
}

/// An owned sequence of bits with an explicit length.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    words: SmallVec<[u64; 2]>,
    len: usize,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: SmallVec::with_capacity(words_for(bits)),
            len: 0,
        }
    }

    pub fn from_bools(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut out = Self::new();
        for bit in bits {
            out.push(bit);
        }
        out
    }

    /// The leading `len` bits of `value`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 32`.
    pub fn from_u32(value: u32, len: usize) -> Self {
        assert!(len <= 32, "a u32 has only 32 bits, asked for {len}");
        let mut out = Self::new();
        if len > 0 {
            out.words.push(((value as u64) << 32) & high_mask(len));
        }
        out.len = len;
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<bool> {
        (i < self.len).then(|| self.bit(i))
    }

    /// Bit at `i`. Callers must stay below `len`.
    #[inline]
    pub(crate) fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        (self.words[i / WORD_BITS] >> (WORD_BITS - 1 - i % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn first(&self) -> Option<bool> {
        self.get(0)
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / WORD_BITS] |= 1u64 << (WORD_BITS - 1 - self.len % WORD_BITS);
        }
        self.len += 1;
    }

    /// Appends every bit of `other`.
    pub fn extend_from(&mut self, other: &BitString) {
        self.words.reserve(words_for(self.len + other.len) - self.words.len());
        for bit in other.iter() {
            self.push(bit);
        }
    }

    /// `self` followed by `other`, as a new string.
    pub fn concat(&self, other: &BitString) -> BitString {
        let mut out = self.clone();
        out.extend_from(other);
        out
    }

    /// Copies out the bits in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past `len`.
    pub fn slice(&self, range: Range<usize>) -> BitString {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "slice {:?} out of bounds for {} bits",
            range,
            self.len
        );
        let len = range.end - range.start;
        let mut words: SmallVec<[u64; 2]> = (0..words_for(len))
            .map(|w| self.chunk(range.start + w * WORD_BITS))
            .collect();
        if let Some(last) = words.last_mut() {
            let tail = len % WORD_BITS;
            if tail != 0 {
                *last &= high_mask(tail);
            }
        }
        BitString { words, len }
    }

    /// Shortens the string to its first `len` bits. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.words.truncate(words_for(len));
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= high_mask(tail);
            }
        }
    }

    /// Number of equal leading bits between `self[offset..]` and
    /// `other[other_offset..]`, compared a word at a time.
    pub fn common_prefix_len(
        &self,
        offset: usize,
        other: &BitString,
        other_offset: usize,
    ) -> usize {
        let max = self
            .len
            .saturating_sub(offset)
            .min(other.len.saturating_sub(other_offset));
        let mut n = 0;
        while n < max {
            let diff = self.chunk(offset + n) ^ other.chunk(other_offset + n);
            let remaining = max - n;
            if diff != 0 {
                return n + (diff.leading_zeros() as usize).min(remaining);
            }
            n += remaining.min(WORD_BITS);
        }
        max
    }

    /// Whether `prefix` occurs in `self` starting at bit `offset`.
    pub fn starts_with_at(&self, offset: usize, prefix: &BitString) -> bool {
        self.len.saturating_sub(offset) >= prefix.len
            && self.common_prefix_len(offset, prefix, 0) == prefix.len
    }

    pub fn starts_with(&self, prefix: &BitString) -> bool {
        self.starts_with_at(0, prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// The 64 bits starting at `start`, zero-filled past the end.
    #[inline]
    fn chunk(&self, start: usize) -> u64 {
        let w = start / WORD_BITS;
        let shift = start % WORD_BITS;
        let hi = self.words.get(w).copied().unwrap_or(0);
        if shift == 0 {
            hi
        } else {
            let lo = self.words.get(w + 1).copied().unwrap_or(0);
            (hi << shift) | (lo >> (WORD_BITS - shift))
        }
    }
}

impl FromStr for BitString {
    type Err = ParseBitsError;

    /// Parses a string of `0` and `1` characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = BitString::with_capacity(s.len());
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => out.push(false),
                '1' => out.push(true),
                found => return Err(ParseBitsError { position, found }),
            }
        }
        Ok(out)
    }
}

/// Lexicographic by bit, with a prefix ordered before its extensions.
impl Ord for BitString {
    fn cmp(&self, other: &Self) -> Ordering {
        let cp = self.common_prefix_len(0, other, 0);
        match (cp == self.len, cp == other.len) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.bit(cp).cmp(&other.bit(cp)),
        }
    }
}

impl PartialOrd for BitString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self::from_bools(iter)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString(\"{self}\")")
    }
}
