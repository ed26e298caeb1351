use super::{HardwareBlurProvider, HardwareBlurSession};
use crate::{BackendFault, PixelBuffer};
use libblur::{BlurImage, BlurImageMut, BoxBlurParameters, FastBlurChannels, ThreadingPolicy};

/// [`HardwareBlurProvider`] backed by the SIMD kernels of the `libblur`
/// crate. Runs a box blur whose kernel spans the same `2r + 1` taps as
/// the stack blur.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibBlurProvider;

impl HardwareBlurProvider for LibBlurProvider {
    fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
        Ok(Box::new(LibBlurSession {
            #[cfg(feature = "rayon")]
            threading: ThreadingPolicy::Adaptive,
            #[cfg(not(feature = "rayon"))]
            threading: ThreadingPolicy::Single,
        }))
    }
}

struct LibBlurSession {
    threading: ThreadingPolicy,
}

impl HardwareBlurSession for LibBlurSession {
    fn blur(&mut self, input: &PixelBuffer, radius: u32) -> Result<PixelBuffer, BackendFault> {
        if radius == 0 {
            return Err(BackendFault::Unsupported("radius 0".into()));
        }

        let width = input.width();
        let height = input.height();
        let mut out = vec![0u8; input.as_bytes().len()];

        {
            let src_image =
                BlurImage::borrow(input.as_bytes(), width, height, FastBlurChannels::Channels4);
            let mut dst_image =
                BlurImageMut::borrow(&mut out, width, height, FastBlurChannels::Channels4);

            libblur::box_blur(
                &src_image,
                &mut dst_image,
                BoxBlurParameters::new(2 * radius + 1),
                self.threading,
            )
            .map_err(|e| BackendFault::Runtime(format!("{e:?}")))?;
        }

        PixelBuffer::from_raw(width, height, out)
            .map_err(|e| BackendFault::Runtime(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{blur_with_provider, BlurConfig};

    fn left_column_white(size: u32) -> PixelBuffer {
        let pixels = (0..size * size)
            .map(|i| if i % size == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
            .collect();
        PixelBuffer::from_pixels(size, size, pixels).unwrap()
    }

    #[test]
    fn output_matches_input_size() {
        let input = PixelBuffer::filled(13, 7, [10, 20, 30, 255]).unwrap();
        let out = LibBlurProvider.init().unwrap().blur(&input, 3).unwrap();
        assert_eq!((out.width(), out.height()), (13, 7));
    }

    #[test]
    fn left_edge_replicates() {
        let input = left_column_white(8);
        let out = LibBlurProvider.init().unwrap().blur(&input, 1).unwrap();
        for y in 0..8 {
            let reds: Vec<u8> = out.row(y).iter().map(|p| p[0]).collect();
            assert_eq!(reds, vec![170, 85, 0, 0, 0, 0, 0, 0], "row {y}");
        }
    }

    #[test]
    fn pipeline_keeps_alpha() {
        let pixels = (0..64u32)
            .map(|i| [(i * 4) as u8, 0, 255 - (i * 3) as u8, (i * 3 + 40) as u8])
            .collect();
        let source = PixelBuffer::from_pixels(8, 8, pixels).unwrap();
        let config = BlurConfig::new(8, 8).with_radius(2);
        let out = blur_with_provider(&source, &config, &LibBlurProvider).unwrap();
        let alpha_in = source.pixels().iter().map(|p| p[3]);
        let alpha_out = out.pixels().iter().map(|p| p[3]);
        assert!(alpha_in.eq(alpha_out));
    }

    #[test]
    fn zero_radius_is_unsupported() {
        let input = PixelBuffer::filled(2, 2, [0; 4]).unwrap();
        assert!(matches!(
            LibBlurProvider.init().unwrap().blur(&input, 0),
            Err(BackendFault::Unsupported(_))
        ));
    }
}
