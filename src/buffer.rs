use crate::BlurError;

/// One straight-alpha RGBA pixel, `[r, g, b, a]`.
pub type Pixel = [u8; 4];

/// An owned, row-major grid of RGBA8 pixels.
///
/// The length of the backing storage always equals `width * height`
/// and both dimensions are non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Create a buffer filled with a single pixel value.
    ///
    /// # Errors
    /// - If `width` or `height` is 0
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self, BlurError> {
        let len = pixel_count(width, height);
        Self::from_pixels(width, height, vec![pixel; len])
    }

    /// Wrap existing pixel storage.
    ///
    /// # Errors
    /// - If `width` or `height` is 0
    /// - If `pixels.len() != width * height`
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, BlurError> {
        if width == 0 || height == 0 || pixels.len() != pixel_count(width, height) {
            return Err(BlurError::InvalidBuffer {
                width,
                height,
                len: pixels.len(),
            });
        }

        Ok(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Build a buffer from interleaved RGBA bytes, the layout used by
    /// `image::RgbaImage` and most capture APIs.
    ///
    /// # Errors
    /// - If the byte length is not `4 * width * height`
    /// - If `width` or `height` is 0
    pub fn from_raw(width: u32, height: u32, raw: Vec<u8>) -> Result<Self, BlurError> {
        if raw.len() % 4 != 0 {
            return Err(BlurError::InvalidBuffer {
                width,
                height,
                len: raw.len() / 4,
            });
        }
        let pixels = raw
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Mutable access to the pixels. The slice cannot be resized, so the
    /// length invariant holds.
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// The storage viewed as interleaved RGBA bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_flattened()
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels.into_iter().flatten().collect()
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Row `y` as a slice of `width` pixels.
    ///
    /// # Panics
    /// - If `y >= height`
    #[must_use]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let width = self.width as usize;
        let start = y as usize * width;
        &self.pixels[start..start + width]
    }
}

pub(crate) const fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
