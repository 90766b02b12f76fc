//! Row-major pixel storage for rasterized layers.

/// Owned buffer of premultiplied ARGB pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer with a tightly packed stride.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            stride: width,
            pixels: vec![0; len],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Distance in pixels between the starts of consecutive rows.
    #[must_use]
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// Raw pixel data in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at column `x` and row `y`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Writes a pixel, returning `false` when the coordinate is out of range.
    pub fn set(&mut self, x: u32, y: u32, pixel: u32) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.pixels[index] = pixel;
                true
            }
            None => false,
        }
    }

    /// Reports whether every pixel is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.pixels.iter().all(|pixel| *pixel == 0)
    }

    /// Serialises the pixels as little-endian BGRA bytes.
    #[must_use]
    pub fn to_bgra_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|pixel| pixel.to_le_bytes())
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = u64::from(y) * u64::from(self.stride) + u64::from(x);
        usize::try_from(offset).ok()
    }
}
