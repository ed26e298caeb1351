mod stack;

#[cfg(feature = "libblur")]
mod libblur_impl;

use std::panic::{self, AssertUnwindSafe};

#[cfg(feature = "libblur")]
pub use libblur_impl::LibBlurProvider;
pub use stack::{stack_blur, StackBlur, MAX_RADIUS};

use crate::{BackendFault, PixelBuffer};

/// An alternate, usually accelerated, blur backend.
///
/// [`BlurPipeline`][crate::BlurPipeline] tries the provider first and falls
/// back to [`StackBlur`] on any [`BackendFault`], including a panic inside
/// the backend. Resources acquired in [`init`][Self::init] belong to the
/// returned session and are released when it is dropped.
pub trait HardwareBlurProvider {
    /// Open a session, acquiring whatever the backend needs.
    ///
    /// # Errors
    /// - If the backend is unavailable on this machine
    fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault>;
}

/// A live backend session.
///
/// Implementations must follow the same contract as [`StackBlur`]: blur
/// the color channels with edge replication, keep alpha, and return a
/// buffer the size of `input`. `input` is never modified.
pub trait HardwareBlurSession {
    /// # Errors
    /// - If the backend cannot handle `radius` or fails mid-run
    fn blur(&mut self, input: &PixelBuffer, radius: u32) -> Result<PixelBuffer, BackendFault>;
}

/// Run one blur through `provider`, turning panics into
/// [`BackendFault::Panicked`]. The session is dropped before returning on
/// every path.
pub(crate) fn blur_on_backend(
    provider: &dyn HardwareBlurProvider,
    input: &PixelBuffer,
    radius: u32,
) -> Result<PixelBuffer, BackendFault> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut session = provider.init()?;
        session.blur(input, radius)
    }));
    let mut output = outcome.map_err(|_panic| BackendFault::Panicked)??;

    if output.width() != input.width() || output.height() != input.height() {
        return Err(BackendFault::DimensionMismatch {
            width: input.width(),
            height: input.height(),
            got_width: output.width(),
            got_height: output.height(),
        });
    }

    // alpha passes through regardless of what the backend did with it
    for (out, src) in output.pixels_mut().iter_mut().zip(input.pixels()) {
        out[3] = src[3];
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    struct Failing;

    impl HardwareBlurProvider for Failing {
        fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
            Err(BackendFault::Init("no device".into()))
        }
    }

    struct Panicking;

    impl HardwareBlurSession for Panicking {
        fn blur(&mut self, _: &PixelBuffer, _: u32) -> Result<PixelBuffer, BackendFault> {
            panic!("driver crashed")
        }
    }

    impl HardwareBlurProvider for Panicking {
        fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
            Ok(Box::new(Panicking))
        }
    }

    struct Shrinking;

    impl HardwareBlurSession for Shrinking {
        fn blur(&mut self, _: &PixelBuffer, _: u32) -> Result<PixelBuffer, BackendFault> {
            Ok(PixelBuffer::filled(1, 1, [0; 4]).unwrap())
        }
    }

    impl HardwareBlurProvider for Shrinking {
        fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
            Ok(Box::new(Shrinking))
        }
    }

    struct Whiteout;

    impl HardwareBlurSession for Whiteout {
        fn blur(&mut self, input: &PixelBuffer, _: u32) -> Result<PixelBuffer, BackendFault> {
            Ok(PixelBuffer::filled(input.width(), input.height(), [255; 4]).unwrap())
        }
    }

    impl HardwareBlurProvider for Whiteout {
        fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
            Ok(Box::new(Whiteout))
        }
    }

    /// Session that records its own release and then fails in the chosen way.
    struct Tracked {
        released: Arc<AtomicBool>,
        panics: bool,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    impl HardwareBlurSession for Tracked {
        fn blur(&mut self, _: &PixelBuffer, _: u32) -> Result<PixelBuffer, BackendFault> {
            if self.panics {
                panic!("device lost");
            }
            Err(BackendFault::Runtime("queue timeout".into()))
        }
    }

    struct TrackedProvider {
        released: Arc<AtomicBool>,
        panics: bool,
    }

    impl HardwareBlurProvider for TrackedProvider {
        fn init(&self) -> Result<Box<dyn HardwareBlurSession + '_>, BackendFault> {
            Ok(Box::new(Tracked {
                released: Arc::clone(&self.released),
                panics: self.panics,
            }))
        }
    }

    #[test]
    fn init_failure_is_reported() {
        let input = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            blur_on_backend(&Failing, &input, 3),
            Err(BackendFault::Init("no device".into()))
        );
    }

    #[test]
    fn panic_becomes_fault() {
        let input = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            blur_on_backend(&Panicking, &input, 3),
            Err(BackendFault::Panicked)
        );
    }

    #[test]
    fn wrong_size_is_a_fault() {
        let input = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert!(matches!(
            blur_on_backend(&Shrinking, &input, 3),
            Err(BackendFault::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn alpha_is_restored_from_input() {
        let input = PixelBuffer::filled(3, 2, [1, 2, 3, 77]).unwrap();
        let out = blur_on_backend(&Whiteout, &input, 3).unwrap();
        assert!(out.pixels().iter().all(|&p| p == [255, 255, 255, 77]));
    }

    #[test]
    fn session_is_released_after_runtime_fault() {
        let released = Arc::new(AtomicBool::new(false));
        let provider = TrackedProvider {
            released: Arc::clone(&released),
            panics: false,
        };
        let input = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            blur_on_backend(&provider, &input, 3),
            Err(BackendFault::Runtime("queue timeout".into()))
        );
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn session_is_released_after_panic() {
        let released = Arc::new(AtomicBool::new(false));
        let provider = TrackedProvider {
            released: Arc::clone(&released),
            panics: true,
        };
        let input = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            blur_on_backend(&provider, &input, 3),
            Err(BackendFault::Panicked)
        );
        assert!(released.load(Ordering::SeqCst));
    }
}
