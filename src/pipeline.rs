use tracing::{debug, trace, warn};

use crate::blur::blur_on_backend;
use crate::resample::{downsample_tint, upscale};
use crate::{BlurConfig, BlurError, HardwareBlurProvider, PixelBuffer, StackBlur};

/// Stage of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Downsampling,
    Blurring,
    Upscaling,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether `self -> next` is an edge of the pipeline's state machine.
    #[must_use]
    pub const fn can_advance_to(self, next: PipelineState) -> bool {
        matches!(
            (self, next),
            (PipelineState::Idle, PipelineState::Downsampling)
                | (PipelineState::Downsampling, PipelineState::Blurring)
                | (PipelineState::Downsampling, PipelineState::Failed)
                | (PipelineState::Blurring, PipelineState::Upscaling)
                | (PipelineState::Upscaling, PipelineState::Done)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Downsample, blur, upscale.
///
/// A pipeline runs exactly once: [`run`][Self::run] consumes it. The
/// hardware provider, if any, is tried first and [`StackBlur`] takes over
/// when it faults.
pub struct BlurPipeline<'a> {
    config: BlurConfig,
    provider: Option<&'a dyn HardwareBlurProvider>,
    state: PipelineState,
}

impl<'a> BlurPipeline<'a> {
    #[must_use]
    pub const fn new(config: BlurConfig) -> Self {
        BlurPipeline {
            config,
            provider: None,
            state: PipelineState::Idle,
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: &'a dyn HardwareBlurProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Blur `source` into a new `config.width` x `config.height` buffer.
    /// `source` itself is never modified.
    ///
    /// # Errors
    /// - [`BlurError::DegenerateDimension`] if the downsampled size has a zero
    ///   dimension
    pub fn run(mut self, source: &PixelBuffer) -> Result<PixelBuffer, BlurError> {
        self.advance(PipelineState::Downsampling);
        let small = match downsample_tint(source, &self.config) {
            Ok(small) => small,
            Err(e) => {
                self.advance(PipelineState::Failed);
                return Err(e);
            }
        };
        debug!(
            width = small.width(),
            height = small.height(),
            sampling = self.config.sampling,
            "downsampled"
        );

        self.advance(PipelineState::Blurring);
        let blurred = self.blur_stage(small);

        self.advance(PipelineState::Upscaling);
        let output = upscale(blurred, &self.config)?;

        self.advance(PipelineState::Done);
        Ok(output)
    }

    fn blur_stage(&self, mut buffer: PixelBuffer) -> PixelBuffer {
        let Ok(engine) = StackBlur::new(self.config.radius) else {
            debug!(radius = self.config.radius, "no blur requested");
            return buffer;
        };

        if let Some(provider) = self.provider {
            match blur_on_backend(provider, &buffer, engine.radius() as u32) {
                Ok(blurred) => return blurred,
                Err(fault) => warn!(%fault, "hardware blur failed, using stack blur"),
            }
        }

        engine.blur(&mut buffer);
        buffer
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        trace!(from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }
}

/// Run the pipeline in software only.
///
/// # Errors
/// - [`BlurError::DegenerateDimension`] if `config.width / config.sampling`
///   or `config.height / config.sampling` is 0
pub fn blur(source: &PixelBuffer, config: &BlurConfig) -> Result<PixelBuffer, BlurError> {
    BlurPipeline::new(*config).run(source)
}

/// Run the pipeline, preferring `provider` for the blur stage.
///
/// # Errors
/// - [`BlurError::DegenerateDimension`] if `config.width / config.sampling`
///   or `config.height / config.sampling` is 0
pub fn blur_with_provider(
    source: &PixelBuffer,
    config: &BlurConfig,
    provider: &dyn HardwareBlurProvider,
) -> Result<PixelBuffer, BlurError> {
    BlurPipeline::new(*config)
        .with_provider(provider)
        .run(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_edges() {
        use PipelineState::*;
        assert!(Idle.can_advance_to(Downsampling));
        assert!(Downsampling.can_advance_to(Failed));
        assert!(Upscaling.can_advance_to(Done));
        assert!(!Idle.can_advance_to(Blurring));
        assert!(!Done.can_advance_to(Idle));
        assert!(!Failed.can_advance_to(Downsampling));
        assert!(Done.is_terminal() && Failed.is_terminal());
        assert!(!Blurring.is_terminal());
    }

    #[test]
    fn fresh_pipeline_is_idle() {
        let pipeline = BlurPipeline::new(BlurConfig::new(4, 4));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn zero_radius_passes_buffer_through() {
        let pixels = (0..16u8).map(|i| [i * 10, 255 - i, i, 200]).collect();
        let source = PixelBuffer::from_pixels(4, 4, pixels).unwrap();
        let config = BlurConfig::new(4, 4).with_radius(0);
        assert_eq!(blur(&source, &config).unwrap(), source);
    }

    #[test]
    fn zero_target_width_fails() {
        let source = PixelBuffer::filled(4, 4, [0; 4]).unwrap();
        for sampling in [1, 2, 8] {
            let config = BlurConfig::new(0, 4).with_sampling(sampling);
            assert!(matches!(
                blur(&source, &config),
                Err(BlurError::DegenerateDimension { width: 0, .. })
            ));
        }
    }
}
