//! CameraSource — camera sensor noise via ffmpeg.
//!
//! Captures frames of 16-bit grayscale raw video from the default camera
//! (avfoundation on macOS, v4l2 on Linux). Sensor dark current and read
//! noise dominate the low bits of each pixel sample.

use crate::error::Result;
use crate::source::{EntropySource, SampleAccumulator, SourceInfo};

use super::helpers::{command_exists, run_ffmpeg};

static CAMERA_INFO: SourceInfo = SourceInfo {
    name: "camera",
    description: "Camera sensor dark current and shot noise via ffmpeg",
    physics: "Photodiodes generate dark current from thermal electron-hole \
              pair generation in silicon, and amplifier read noise adds \
              further randomness. Both land in the low bits of the 16-bit \
              pixel samples.",
    bits_per_sample: 16,
};

/// Entropy source that harvests sensor noise from camera frames.
pub struct CameraSource {
    acc: SampleAccumulator,
}

impl CameraSource {
    pub fn new() -> Self {
        Self {
            acc: SampleAccumulator::new(16),
        }
    }

    fn capture_args(frames: &str) -> Vec<&str> {
        #[cfg(target_os = "macos")]
        let input: &[&str] = &["-f", "avfoundation", "-framerate", "30", "-i", "0"];
        #[cfg(not(target_os = "macos"))]
        let input: &[&str] = &["-f", "v4l2", "-i", "/dev/video0"];

        let mut args: Vec<&str> = input.to_vec();
        args.extend_from_slice(&[
            "-frames:v",
            frames,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "gray16le",
            "pipe:1",
        ]);
        args
    }
}

impl Default for CameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for CameraSource {
    fn info(&self) -> &SourceInfo {
        &CAMERA_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    /// `amount` is the number of frames to capture.
    fn capture(&mut self, amount: usize) -> Result<()> {
        let frames = amount.to_string();
        let raw = run_ffmpeg(&Self::capture_args(&frames))?;

        for pixel in raw.chunks_exact(2) {
            self.acc.push_sample_u16(u16::from_le_bytes([pixel[0], pixel[1]]));
        }
        Ok(())
    }

    fn bit_entropy(&self) -> Vec<f64> {
        self.acc.bit_entropy()
    }

    fn drain(&mut self, out: &mut Vec<u8>) {
        self.acc.drain(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_info() {
        let src = CameraSource::new();
        assert_eq!(src.name(), "camera");
        assert_eq!(src.info().bits_per_sample, 16);
    }

    #[test]
    fn args_request_raw_gray16() {
        let args = CameraSource::capture_args("15");
        assert!(args.contains(&"gray16le"));
        assert!(args.contains(&"15"));
    }
}
