use thiserror::Error;

/// Errors produced by the blur pipeline and its stages.
///
/// Only [`DegenerateDimension`][BlurError::DegenerateDimension] escapes
/// [`blur`][crate::blur]; the pipeline absorbs
/// [`NoBlurRequested`][BlurError::NoBlurRequested] and never returns it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlurError {
    #[error("target size {width}x{height} at sampling {sampling} leaves no pixels to blur")]
    DegenerateDimension {
        width: u32,
        height: u32,
        sampling: u32,
    },
    #[error("radius {radius} is below 1, nothing to blur")]
    NoBlurRequested { radius: i32 },
    #[error("buffer of {len} pixels does not describe a {width}x{height} image")]
    InvalidBuffer { width: u32, height: u32, len: usize },
}

/// Failure reported by a [`HardwareBlurProvider`][crate::HardwareBlurProvider].
///
/// The pipeline recovers from every variant by falling back to
/// [`StackBlur`][crate::StackBlur].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFault {
    #[error("backend initialization failed: {0}")]
    Init(String),
    #[error("backend does not support this configuration: {0}")]
    Unsupported(String),
    #[error("backend failed while blurring: {0}")]
    Runtime(String),
    #[error("backend panicked")]
    Panicked,
    #[error("backend returned a {got_width}x{got_height} buffer, expected {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}
