use tracing::debug;

use crate::{BlurError, PixelBuffer};

/// Largest radius the engine honours; larger requests are clamped.
pub const MAX_RADIUS: u32 = 254;

type Rgb = [u8; 3];

/// Stack Blur by Mario Klingemann: a moving stack of colors with
/// triangular weights, updated in O(1) per pixel regardless of radius.
///
/// Applied as a horizontal pass followed by a vertical pass. Window taps
/// past either end of a line replicate the edge pixel. Only the color
/// channels are blurred; alpha is copied through untouched.
#[derive(Debug, Clone)]
pub struct StackBlur {
    radius: usize,
    /// `div_table[v] == v / divsum` for every reachable weighted sum `v`.
    div_table: Vec<u8>,
}

impl StackBlur {
    /// Prepare the engine for the given radius. Radii above [`MAX_RADIUS`]
    /// are clamped to it.
    ///
    /// # Errors
    /// - [`BlurError::NoBlurRequested`] if `radius < 1`
    pub fn new(radius: i32) -> Result<Self, BlurError> {
        if radius < 1 {
            return Err(BlurError::NoBlurRequested { radius });
        }
        if radius.unsigned_abs() > MAX_RADIUS {
            debug!(radius, max = MAX_RADIUS, "radius clamped");
        }
        let radius = radius.unsigned_abs().min(MAX_RADIUS) as usize;

        // ((2r + 1 + 1) >> 1)^2 == (r + 1)^2, the sum of the triangular weights
        let divsum = ((2 * radius + 2) >> 1).pow(2);
        let div_table = (0..256 * divsum).map(|v| (v / divsum) as u8).collect();

        Ok(StackBlur { radius, div_table })
    }

    #[must_use]
    pub const fn radius(&self) -> usize {
        self.radius
    }

    /// Blur the color channels of `buffer` in place.
    pub fn blur(&self, buffer: &mut PixelBuffer) {
        let width = buffer.width() as usize;
        let height = buffer.height() as usize;

        let source: Vec<Rgb> = buffer
            .pixels()
            .iter()
            .map(|&[r, g, b, _]| [r, g, b])
            .collect();
        let mut temp = vec![[0u8; 3]; source.len()];
        self.horizontal_pass(&source, &mut temp, width);

        let mut out = source;
        self.vertical_pass(&temp, &mut out, width, height);

        for (pixel, &[r, g, b]) in buffer.pixels_mut().iter_mut().zip(out.iter()) {
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
        }
    }

    #[inline(always)]
    fn horizontal_pass(&self, input: &[Rgb], output: &mut [Rgb], width: usize) {
        assert_eq!(input.len(), output.len());
        let div = 2 * self.radius + 1;

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            input
                .par_chunks_exact(width)
                .zip(output.par_chunks_exact_mut(width))
                .for_each_init(
                    || vec![[0u8; 3]; div],
                    |stack, (input, output)| self.horizontal_row(input, output, stack),
                );
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut stack = vec![[0u8; 3]; div];
            input
                .chunks_exact(width)
                .zip(output.chunks_exact_mut(width))
                .for_each(|(input, output)| self.horizontal_row(input, output, &mut stack));
        }
    }

    /// One line of the sweep. `stack` holds `2 * radius + 1` slots and is
    /// fully overwritten before use.
    #[inline(always)]
    fn horizontal_row(&self, input: &[Rgb], output: &mut [Rgb], stack: &mut [Rgb]) {
        let radius = self.radius;
        let div = stack.len();
        let last = input.len() - 1;

        let mut sum = [0u32; 3];
        let mut sum_in = [0u32; 3];
        let mut sum_out = [0u32; 3];

        // window centered on index 0; slot i holds offset i - radius
        for (i, slot) in stack.iter_mut().enumerate() {
            let src = input[i.saturating_sub(radius).min(last)];
            *slot = src;
            let weight = (radius + 1 - i.abs_diff(radius)) as u32;
            for c in 0..3 {
                let v = u32::from(src[c]);
                sum[c] += v * weight;
                if i > radius {
                    sum_in[c] += v;
                } else {
                    sum_out[c] += v;
                }
            }
        }

        let mut stack_ptr = radius;
        for (x, out) in output.iter_mut().enumerate() {
            *out = [
                self.div_table[sum[0] as usize],
                self.div_table[sum[1] as usize],
                self.div_table[sum[2] as usize],
            ];

            let stack_start = (stack_ptr + div - radius) % div;
            let leaving = stack[stack_start];
            let entering = input[(x + radius + 1).min(last)];
            stack[stack_start] = entering;

            for c in 0..3 {
                sum[c] -= sum_out[c];
                sum_out[c] -= u32::from(leaving[c]);
                sum_in[c] += u32::from(entering[c]);
                sum[c] += sum_in[c];
            }

            stack_ptr += 1;
            if stack_ptr == div {
                stack_ptr = 0;
            }

            let center = stack[stack_ptr];
            for c in 0..3 {
                sum_out[c] += u32::from(center[c]);
                sum_in[c] -= u32::from(center[c]);
            }
        }
    }

    #[inline(always)]
    fn transpose(input: &[Rgb], output: &mut [Rgb], width: usize, height: usize) {
        assert_eq!(input.len(), width * height);
        assert_eq!(output.len(), width * height);

        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .for_each(|(x, y)| output[x * height + y] = input[y * width + x]);
    }

    /// Columns are swept by transposing, running the row sweep over each
    /// column, and transposing back.
    #[inline(always)]
    fn vertical_pass(&self, input: &[Rgb], output: &mut [Rgb], width: usize, height: usize) {
        let size = width * height;
        assert_eq!(input.len(), size);
        assert_eq!(output.len(), size);

        let mut transposed_input = vec![[0u8; 3]; size];
        let mut transposed_output = vec![[0u8; 3]; size];

        Self::transpose(input, &mut transposed_input, width, height);
        self.horizontal_pass(&transposed_input, &mut transposed_output, height);
        Self::transpose(&transposed_output, output, height, width);
    }
}

/// Blur `buffer` in place with a freshly prepared [`StackBlur`].
///
/// # Errors
/// - [`BlurError::NoBlurRequested`] if `radius < 1`; the buffer is untouched
pub fn stack_blur(buffer: &mut PixelBuffer, radius: i32) -> Result<(), BlurError> {
    StackBlur::new(radius)?.blur(buffer);
    Ok(())
}
