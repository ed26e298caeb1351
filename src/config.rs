use crate::BlurError;

/// A straight-alpha RGBA color used as the tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Unpack a `0xAARRGGBB` color int.
    #[must_use]
    pub const fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Color { r, g, b, a }
    }

    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Parameters for one invocation of the blur pipeline.
///
/// `width` and `height` are the final output dimensions. The blur itself
/// runs on a `width / sampling` by `height / sampling` copy of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurConfig {
    pub radius: i32,
    pub sampling: u32,
    pub tint: Color,
    pub width: u32,
    pub height: u32,
}

impl BlurConfig {
    pub const DEFAULT_RADIUS: i32 = 25;
    pub const DEFAULT_SAMPLING: u32 = 1;

    /// A config producing a `width`x`height` output with default radius,
    /// no downsampling and no tint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        BlurConfig {
            radius: Self::DEFAULT_RADIUS,
            sampling: Self::DEFAULT_SAMPLING,
            tint: Color::TRANSPARENT,
            width,
            height,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: i32) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, sampling: u32) -> Self {
        self.sampling = sampling;
        self
    }

    #[must_use]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Size of the intermediate buffer the blur runs on.
    ///
    /// # Errors
    /// - If either dimension rounds down to 0, or `sampling` is 0
    pub fn downsampled_size(&self) -> Result<(u32, u32), BlurError> {
        if self.sampling == 0 {
            return Err(self.degenerate());
        }
        let width = self.width / self.sampling;
        let height = self.height / self.sampling;
        if width == 0 || height == 0 {
            return Err(self.degenerate());
        }
        Ok((width, height))
    }

    fn degenerate(&self) -> BlurError {
        BlurError::DegenerateDimension {
            width: self.width,
            height: self.height,
            sampling: self.sampling,
        }
    }
}
