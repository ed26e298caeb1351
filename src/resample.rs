use crate::buffer::pixel_count;
use crate::{BlurConfig, BlurError, Color, Pixel, PixelBuffer};

/// Scale `source` down by `config.sampling` and composite the tint over it.
///
/// The source is drawn at `1 / sampling` scale anchored at the top-left
/// corner; destination pixels whose footprint falls outside the source
/// stay fully transparent. The tint is composited source-atop: it
/// recolors covered pixels and never adds coverage.
///
/// # Errors
/// - [`BlurError::DegenerateDimension`] if the downsampled size has a zero
///   dimension
pub fn downsample_tint(source: &PixelBuffer, config: &BlurConfig) -> Result<PixelBuffer, BlurError> {
    let (width, height) = config.downsampled_size()?;
    let scale = config.sampling as f32;
    let src_width = source.width() as f32;
    let src_height = source.height() as f32;
    let tint = config.tint;

    render(width, height, |x, y| {
        let center_x = (x as f32 + 0.5) * scale;
        let center_y = (y as f32 + 0.5) * scale;
        if center_x > src_width || center_y > src_height {
            return [0; 4];
        }
        let pixel = sample_bilinear(source, center_x - 0.5, center_y - 0.5);
        tint_atop(pixel, tint)
    })
}

/// Resample the blurred buffer back up to `config.width` x `config.height`
/// with bilinear filtering.
///
/// With `sampling == 1` the buffer is returned as is.
///
/// # Errors
/// - [`BlurError::DegenerateDimension`] if the target size has a zero
///   dimension
pub fn upscale(buffer: PixelBuffer, config: &BlurConfig) -> Result<PixelBuffer, BlurError> {
    if config.sampling == 1 {
        return Ok(buffer);
    }
    if config.width == 0 || config.height == 0 {
        return Err(BlurError::DegenerateDimension {
            width: config.width,
            height: config.height,
            sampling: config.sampling,
        });
    }
    if buffer.width() == config.width && buffer.height() == config.height {
        return Ok(buffer);
    }

    let scale_x = buffer.width() as f32 / config.width as f32;
    let scale_y = buffer.height() as f32 / config.height as f32;

    render(config.width, config.height, |x, y| {
        sample_bilinear(
            &buffer,
            (x as f32 + 0.5).mul_add(scale_x, -0.5),
            (y as f32 + 0.5).mul_add(scale_y, -0.5),
        )
    })
}

/// Source-atop of `tint` over a straight-alpha pixel: the color moves
/// toward the tint by the tint's alpha, the pixel's alpha is kept.
#[inline(always)]
pub(crate) fn tint_atop(pixel: Pixel, tint: Color) -> Pixel {
    if tint.a == 0 || pixel[3] == 0 {
        return pixel;
    }

    let tint_alpha = u32::from(tint.a);
    let blend = |src: u8, over: u8| {
        ((u32::from(over) * tint_alpha + u32::from(src) * (255 - tint_alpha) + 127) / 255) as u8
    };

    [
        blend(pixel[0], tint.r),
        blend(pixel[1], tint.g),
        blend(pixel[2], tint.b),
        pixel[3],
    ]
}

/// Bilinear lookup at continuous pixel coordinates, clamped to the
/// buffer's edge. Integer coordinates return the stored pixel exactly.
#[inline(always)]
fn sample_bilinear(src: &PixelBuffer, fx: f32, fy: f32) -> Pixel {
    let width = src.width() as usize;
    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;
    let fx = fx.clamp(0.0, max_x);
    let fy = fy.clamp(0.0, max_y);

    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(src.width() as usize - 1);
    let y1 = (y0 + 1).min(src.height() as usize - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let pixels = src.pixels();
    let p00 = pixels[y0 * width + x0];
    let p10 = pixels[y0 * width + x1];
    let p01 = pixels[y1 * width + x0];
    let p11 = pixels[y1 * width + x1];

    let mut out = [0u8; 4];
    for (c, out) in out.iter_mut().enumerate() {
        let top = f32::from(p00[c]).mul_add(1.0 - tx, f32::from(p10[c]) * tx);
        let bottom = f32::from(p01[c]).mul_add(1.0 - tx, f32::from(p11[c]) * tx);
        let v = top.mul_add(1.0 - ty, bottom * ty);
        *out = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn render<F>(width: u32, height: u32, f: F) -> Result<PixelBuffer, BlurError>
where
    F: Fn(u32, u32) -> Pixel + Sync,
{
    let mut pixels = vec![[0u8; 4]; pixel_count(width, height)];
    let fill_row = |(y, row): (usize, &mut [Pixel])| {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = f(x as u32, y as u32);
        }
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        pixels
            .par_chunks_exact_mut(width as usize)
            .enumerate()
            .for_each(fill_row);
    }

    #[cfg(not(feature = "rayon"))]
    {
        pixels
            .chunks_exact_mut(width as usize)
            .enumerate()
            .for_each(fill_row);
    }

    PixelBuffer::from_pixels(width, height, pixels)
}
