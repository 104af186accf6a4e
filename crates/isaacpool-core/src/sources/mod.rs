//! Concrete entropy sources.
//!
//! The OS CSPRNG source is always compiled. The camera and microphone
//! sources sit behind the `camera` and `microphone` features; both shell
//! out to `ffmpeg` for capture, so their hard requirement is an `ffmpeg`
//! binary on `PATH` rather than a device SDK.

pub mod os;

#[cfg(feature = "camera")]
pub mod camera;
#[cfg(feature = "microphone")]
pub mod microphone;

#[cfg(any(feature = "camera", feature = "microphone"))]
pub(crate) mod helpers;

pub use os::OsRandomSource;

#[cfg(feature = "camera")]
pub use camera::CameraSource;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneSource;
