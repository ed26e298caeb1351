//! Fast approximate Gaussian blur for RGBA8 pixel buffers.
//!
//! The pipeline scales the source down by an integer sampling factor,
//! optionally tints it, blurs it with a two-pass stack blur (or a
//! [`HardwareBlurProvider`] when one is supplied and works), and scales
//! the result back up to the requested size.
//!
//! ```
//! use blurry::{blur, BlurConfig, PixelBuffer};
//!
//! let source = PixelBuffer::filled(64, 48, [200, 30, 30, 255]).unwrap();
//! let config = BlurConfig::new(64, 48).with_radius(10).with_sampling(4);
//! let blurred = blur(&source, &config).unwrap();
//! assert_eq!((blurred.width(), blurred.height()), (64, 48));
//! ```

#![deny(clippy::all)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::inline_always)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::similar_names)]
#![allow(clippy::use_self)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::exit)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::lossy_float_literal)]
#![warn(clippy::map_err_ignore)]
#![warn(clippy::mem_forget)]
#![warn(clippy::mod_module_files)]
#![warn(clippy::multiple_inherent_impl)]
#![warn(clippy::rc_buffer)]
#![warn(clippy::rc_mutex)]
#![warn(clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::same_name_method)]
#![warn(clippy::str_to_string)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(clippy::use_debug)]

mod blur;
mod buffer;
mod config;
mod error;
mod pipeline;
mod resample;
mod task;

#[cfg(feature = "libblur")]
pub use blur::LibBlurProvider;
pub use blur::{stack_blur, HardwareBlurProvider, HardwareBlurSession, StackBlur, MAX_RADIUS};
pub use buffer::{Pixel, PixelBuffer};
pub use config::{BlurConfig, Color};
pub use error::{BackendFault, BlurError};
pub use pipeline::{blur, blur_with_provider, BlurPipeline, PipelineState};
pub use resample::{downsample_tint, upscale};
pub use task::{BlurTask, SharedProvider};
