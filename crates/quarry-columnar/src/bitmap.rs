/// A compact append-only bit vector used for validity bitmaps and predicate masks.
///
/// Bits are stored little-endian within each `u64` word:
/// - bit 0 is the LSB of word 0
/// - bit 63 is the MSB of word 0
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

impl BitVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
            ones: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }

        if value {
            let word = self.len / 64;
            self.words[word] |= 1u64 << bit;
            self.ones += 1;
        }

        self.len += 1;
    }

    /// Read bit `index`. Out-of-range indices read as `false`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let word = self.words[index / 64];
        ((word >> (index % 64)) & 1) == 1
    }

    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Append every bit of `other` after the current last bit.
    pub fn append(&mut self, other: &BitVec) {
        if self.len % 64 == 0 {
            // Word-aligned: copy whole words.
            self.words.extend_from_slice(&other.words);
            self.len += other.len;
            self.ones += other.ones;
            return;
        }
        for i in 0..other.len {
            self.push(other.get(i));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.get(i))
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut bits = BitVec::with_capacity_bits(iter.size_hint().0);
        for bit in iter {
            bits.push(bit);
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn push_get_and_count() {
        let mut bits = BitVec::new();
        for i in 0..130 {
            bits.push(i % 3 == 0);
        }
        assert_eq!(bits.len(), 130);
        assert_eq!(bits.count_ones(), 44);
        assert!(bits.get(0));
        assert!(!bits.get(1));
        assert!(bits.get(129));
        assert!(!bits.get(130));
    }

    proptest! {
        #[test]
        fn append_matches_pushing_each_bit(
            a in proptest::collection::vec(any::<bool>(), 0..200),
            b in proptest::collection::vec(any::<bool>(), 0..200),
        ) {
            let mut joined: BitVec = a.iter().copied().collect();
            let tail: BitVec = b.iter().copied().collect();
            joined.append(&tail);

            let expected: BitVec = a.iter().chain(b.iter()).copied().collect();
            prop_assert_eq!(joined.len(), expected.len());
            prop_assert_eq!(joined.count_ones(), expected.count_ones());
            prop_assert_eq!(joined.iter().collect::<Vec<_>>(), expected.iter().collect::<Vec<_>>());
        }
    }
}
