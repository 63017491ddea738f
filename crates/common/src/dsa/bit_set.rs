use std::fmt;

/// Growable bit set over zero-based positions.
///
/// Used for column projections and for the column lists of column-level
/// privileges, where it is persisted through `as_bytes`/`from_bytes`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: Vec<u8>,
    len: usize,
}

impl BitSet {
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; (len + 7) / 8],
            len,
        }
    }

    pub fn from_positions(len: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(len);
        positions.into_iter().for_each(|pos| set.set(pos));
        set
    }

    pub fn from_bytes(len: usize, bytes: &[u8]) -> Self {
        let mut bits = bytes.to_vec();
        bits.resize((len + 7) / 8, 0);
        let mut set = Self { bits, len };
        set.clear_tail();
        set
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    pub fn grow(&mut self, len: usize) {
        if len > self.len {
            self.bits.resize((len + 7) / 8, 0);
            self.len = len;
        }
    }

    /// Sets `pos`, growing the set when needed.
    pub fn set(&mut self, pos: usize) {
        self.grow(pos + 1);
        self.bits[pos >> 3] |= 1 << (pos & 7);
    }

    pub fn clear(&mut self, pos: usize) {
        if pos < self.len {
            self.bits[pos >> 3] &= !(1 << (pos & 7));
        }
    }

    pub fn get(&self, pos: usize) -> bool {
        pos < self.len && (self.bits[pos >> 3] >> (pos & 7)) & 1 == 1
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn union(&mut self, other: &BitSet) {
        self.grow(other.len);
        self.bits
            .iter_mut()
            .zip(other.bits.iter())
            .for_each(|(a, b)| *a |= *b);
    }

    /// Removes every position set in `other`.
    pub fn difference(&mut self, other: &BitSet) {
        self.bits
            .iter_mut()
            .zip(other.bits.iter())
            .for_each(|(a, b)| *a &= !*b);
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |pos| self.get(*pos))
    }

    fn clear_tail(&mut self) {
        let tail = self.len & 7;
        if tail != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
