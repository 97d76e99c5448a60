/// Iterate the indices of set bits in a 32-bit mask, lowest first.
///
/// Used for octree child-presence masks (8 bits) and visibility words (32 bits).
#[derive(Debug, Clone, Copy)]
pub struct SetBits(pub u32);

impl Iterator for SetBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetBits {}
