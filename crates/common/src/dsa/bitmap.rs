/// Mutable view of a null bitmap laid over a row buffer.
pub struct BitmapMut<'a>(&'a mut [u8]);

impl<'a> BitmapMut<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self(bytes)
    }

    fn byte_for_index_mut_unchecked(&mut self, idx: usize) -> &mut u8 {
        unsafe { self.0.get_unchecked_mut(idx >> 3) }
    }

    pub fn set_unchecked(&mut self, idx: usize) {
        *self.byte_for_index_mut_unchecked(idx) |= 1 << (idx & 7);
    }

    pub fn unset_unchecked(&mut self, idx: usize) {
        *self.byte_for_index_mut_unchecked(idx) &= !(1 << (idx & 7));
    }
}

pub struct Bitmap<'a>(&'a [u8]);

impl<'a> Bitmap<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    pub fn byte_count(&self) -> usize {
        self.0.len()
    }

    /// Returns false for indexes past the end of the bitmap.
    pub fn is_set(&self, idx: usize) -> bool {
        self.0
            .get(idx >> 3)
            .map(|byte| (byte >> (idx & 7)) & 1 == 1)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_read_back() {
        let mut bytes = [0u8; 2];
        let mut bitmap = BitmapMut::new(&mut bytes);
        bitmap.set_unchecked(0);
        bitmap.set_unchecked(9);
        bitmap.set_unchecked(3);
        bitmap.unset_unchecked(3);

        let bitmap = Bitmap::new(&bytes);
        assert!(bitmap.is_set(0));
        assert!(bitmap.is_set(9));
        assert!(!bitmap.is_set(3));
        assert!(!bitmap.is_set(42));
    }
}
