//! Fixed-width bitset used to record which entry points reach a file

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitSet {
    bits: Vec<u64>,
    bit_count: usize,
}

impl BitSet {
    pub fn new(bit_count: usize) -> Self {
        Self {
            bits: vec![0; bit_count.div_ceil(64)],
            bit_count,
        }
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn has_bit(&self, idx: usize) -> bool {
        let (word, bit) = self.word_bit(idx);
        self.bits[word] & (1u64 << bit) != 0
    }

    pub fn set_bit(&mut self, idx: usize) {
        let (word, bit) = self.word_bit(idx);
        self.bits[word] |= 1u64 << bit;
    }

    pub fn clear_bit(&mut self, idx: usize) {
        let (word, bit) = self.word_bit(idx);
        self.bits[word] &= !(1u64 << bit);
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    pub fn union_with(&mut self, other: &Self) {
        debug_assert_eq!(self.bit_count, other.bit_count);
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
    }

    /// Indices of all set bits, ascending
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .flat_map(|(word_idx, word)| Self::iter_word(*word).map(move |bit| word_idx * 64 + bit))
    }

    /// Hex encoding of the set, suitable as a map key when grouping files
    /// that are reachable from the same entry points
    pub fn to_key(&self) -> String {
        let mut key = String::with_capacity(self.bits.len() * 16);
        for word in &self.bits {
            let _ = write!(key, "{word:016x}");
        }
        key
    }

    fn iter_word(mut word: u64) -> impl Iterator<Item = usize> {
        std::iter::from_fn(move || {
            if word == 0 {
                return None;
            }
            let bit = word.trailing_zeros() as usize;
            word &= word - 1;
            Some(bit)
        })
    }

    fn word_bit(&self, idx: usize) -> (usize, usize) {
        assert!(
            idx < self.bit_count,
            "internal error: bit {idx} is out of range for a bitset of {} bits",
            self.bit_count
        );
        (idx / 64, idx % 64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bitset_is_clear() {
        let bits = BitSet::new(130);
        assert_eq!(bits.bit_count(), 130);
        assert!(bits.is_empty());
        assert!((0..130).all(|i| !bits.has_bit(i)));
    }

    #[test]
    fn test_set_and_clear_across_words() {
        let mut bits = BitSet::new(130);
        bits.set_bit(0);
        bits.set_bit(64);
        bits.set_bit(129);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 64, 129]);

        bits.clear_bit(64);
        assert!(!bits.has_bit(64));
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 129]);
    }

    #[test]
    fn test_key_distinguishes_sets() {
        let mut a = BitSet::new(3);
        let mut b = BitSet::new(3);
        a.set_bit(1);
        b.set_bit(2);
        assert_ne!(a.to_key(), b.to_key());

        b.clear_bit(2);
        b.set_bit(1);
        assert_eq!(a.to_key(), b.to_key());
    }

    #[test]
    fn test_union() {
        let mut a = BitSet::new(2);
        let mut b = BitSet::new(2);
        a.set_bit(0);
        b.set_bit(1);
        a.union_with(&b);
        assert!(a.has_bit(0) && a.has_bit(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_bit_panics() {
        let mut bits = BitSet::new(2);
        bits.set_bit(2);
    }
}
