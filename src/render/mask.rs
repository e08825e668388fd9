//! Binary triangle masks.
//!
//! A [`Mask`] owns one byte per pixel of the working region; [`MaskBuffer`] is
//! the borrowed view rasterizers write into.

/// Owned binary raster, `1` where a triangle covers the pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0
            && y >= 0
            && x < self.width as i64
            && y < self.height as i64
            && self.data[y as usize * self.width as usize + x as usize] != 0
    }

    /// Number of covered pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Covered pixel coordinates in row-major order.
    pub fn covered(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable [`MaskBuffer`] view for rasterization.
    pub fn as_buffer(&mut self) -> MaskBuffer<'_> {
        MaskBuffer::new(&mut self.data, self.width, self.height)
    }
}

/// A view into a mask's bytes.
///
/// Wraps a 1D slice with width/height metadata to enable safe 2D pixel access.
/// All writes are clipped to the buffer.
pub struct MaskBuffer<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> MaskBuffer<'a> {
    /// # Panics
    /// Panics (in debug builds) if the buffer length doesn't match width * height
    pub fn new(data: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize,
            "Mask buffer size doesn't match dimensions"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i64, y: i64) {
        if x >= 0 && x < self.width as i64 && y >= 0 && y < self.height as i64 {
            self.data[y as usize * self.width as usize + x as usize] = 1;
        }
    }

    /// Marks pixels `x_start..x_end` (end exclusive) of row `y`.
    #[inline]
    pub fn fill_scanline(&mut self, y: i64, x_start: i64, x_end: i64) {
        if y < 0 || y >= self.height as i64 {
            return;
        }
        let x_start = x_start.max(0);
        let x_end = x_end.min(self.width as i64);
        if x_start >= x_end {
            return;
        }
        let row = y as usize * self.width as usize;
        self.data[row + x_start as usize..row + x_end as usize].fill(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_scanline_clips() {
        let mut mask = Mask::new(8, 4);
        {
            let mut buffer = mask.as_buffer();
            buffer.fill_scanline(1, -3, 3);
            buffer.fill_scanline(2, 6, 20);
            buffer.fill_scanline(9, 0, 8);
            buffer.fill_scanline(3, 5, 5);
        }
        assert_eq!(mask.count(), 3 + 2);
        assert!(mask.contains(0, 1));
        assert!(mask.contains(2, 1));
        assert!(!mask.contains(3, 1));
        assert!(mask.contains(7, 2));
        assert!(!mask.contains(-1, 1));
    }

    #[test]
    fn test_wide_mask_indexing() {
        let width = 70_000;
        let mut mask = Mask::new(width, 3);
        assert_eq!(mask.as_slice().len(), width as usize * 3);
        {
            let mut buffer = mask.as_buffer();
            buffer.set_pixel(width as i64 - 1, 2);
            buffer.fill_scanline(1, width as i64 - 4, width as i64 + 10);
        }
        assert!(mask.contains(width as i64 - 1, 2));
        assert!(!mask.contains(width as i64 - 1, 0));
        assert_eq!(mask.count(), 5);
        assert_eq!(mask.covered().last(), Some((width - 1, 2)));
    }

    #[test]
    fn test_covered_order() {
        let mut mask = Mask::new(4, 4);
        {
            let mut buffer = mask.as_buffer();
            buffer.set_pixel(3, 0);
            buffer.set_pixel(1, 2);
            buffer.set_pixel(10, 10);
        }
        let covered: Vec<(u32, u32)> = mask.covered().collect();
        assert_eq!(covered, vec![(3, 0), (1, 2)]);
        mask.clear();
        assert_eq!(mask.count(), 0);
    }
}
