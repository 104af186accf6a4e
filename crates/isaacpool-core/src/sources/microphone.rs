//! MicrophoneSource — microphone ADC noise via ffmpeg.
//!
//! Audio capture is inherently asynchronous: a worker thread reads 16-bit
//! PCM from an ffmpeg child process and feeds a mutex-guarded accumulator
//! while the caller does other work. A stop flag observed by the worker
//! ends the capture early; otherwise the window closes when ffmpeg's `-t`
//! duration elapses. `drain` and `bit_entropy` refuse while the stream is
//! active and return a neutral result.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::{Error, Result};
use crate::source::{EntropySource, SampleAccumulator, SourceInfo};

use super::helpers::command_exists;

const SAMPLE_RATE: &str = "44100";
const CHANNELS: &str = "2";

static MICROPHONE_INFO: SourceInfo = SourceInfo {
    name: "microphone",
    description: "Microphone ADC thermal noise via ffmpeg",
    physics: "Johnson-Nyquist noise: thermal agitation of electrons in the \
              input impedance puts random voltage on the ADC even with no \
              signal present. It dominates the low bits of each 16-bit \
              sample.",
    bits_per_sample: 16,
};

/// Entropy source that records a bounded window of microphone samples on a
/// worker thread.
pub struct MicrophoneSource {
    shared: Arc<Mutex<SampleAccumulator>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl MicrophoneSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(SampleAccumulator::new(16))),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Whether a capture window is currently open.
    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Open the capture window. A no-op when a stream is already active.
    pub fn start(&mut self, window_ms: usize) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        self.stop.store(false, Ordering::SeqCst);

        let seconds = format!("{}", window_ms as f64 / 1000.0);
        let mut child = Command::new("ffmpeg")
            .args(Self::capture_args(&seconds))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Device(format!("cannot open microphone stream: {e}")))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Device("microphone stream has no output".into()))?;

        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop);

        self.worker = Some(std::thread::spawn(move || {
            let mut buf = [0u8; 4096];
            let mut carry: Option<u8> = None;
            let mut stopped_early = false;

            loop {
                if stop.load(Ordering::SeqCst) {
                    stopped_early = true;
                    let _ = child.kill();
                    break;
                }
                let n = match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::Device(format!("microphone read failed: {e}")));
                    }
                };

                let mut acc = shared.lock().expect("microphone accumulator poisoned");
                let mut bytes = buf[..n].iter().copied();
                if let Some(low) = carry.take() {
                    if let Some(high) = bytes.next() {
                        acc.push_sample_u16(u16::from_le_bytes([low, high]));
                    } else {
                        carry = Some(low);
                    }
                }
                while let Some(low) = bytes.next() {
                    match bytes.next() {
                        Some(high) => acc.push_sample_u16(u16::from_le_bytes([low, high])),
                        None => carry = Some(low),
                    }
                }
            }

            let status = child
                .wait()
                .map_err(|e| Error::Device(format!("microphone stream lost: {e}")))?;
            if !status.success() && !stopped_early {
                return Err(Error::Device(format!(
                    "microphone capture exited with {status}"
                )));
            }
            Ok(())
        }));
        Ok(())
    }

    /// Close the capture window and release the device. Blocks until the
    /// worker has drained the stream.
    pub fn finish(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.stop.store(true, Ordering::SeqCst);
        worker
            .join()
            .map_err(|_| Error::Device("microphone worker panicked".into()))?
    }

    fn capture_args(seconds: &str) -> Vec<&str> {
        #[cfg(target_os = "macos")]
        let input: &[&str] = &["-f", "avfoundation", "-i", ":0"];
        #[cfg(not(target_os = "macos"))]
        let input: &[&str] = &["-f", "alsa", "-i", "default"];

        let mut args: Vec<&str> = input.to_vec();
        args.extend_from_slice(&[
            "-t",
            seconds,
            "-f",
            "s16le",
            "-ar",
            SAMPLE_RATE,
            "-ac",
            CHANNELS,
            "pipe:1",
        ]);
        args
    }
}

impl Default for MicrophoneSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for MicrophoneSource {
    fn info(&self) -> &SourceInfo {
        &MICROPHONE_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    /// `amount` is the capture window in milliseconds.
    fn capture(&mut self, amount: usize) -> Result<()> {
        self.start(amount)?;
        self.finish()
    }

    fn bit_entropy(&self) -> Vec<f64> {
        if self.is_active() {
            log::warn!("microphone stream still running; entropy estimate withheld");
            return vec![0.0; MICROPHONE_INFO.bits_per_sample];
        }
        self.shared
            .lock()
            .expect("microphone accumulator poisoned")
            .bit_entropy()
    }

    fn drain(&mut self, out: &mut Vec<u8>) {
        if self.is_active() {
            log::warn!("microphone stream still running; drain refused");
            return;
        }
        self.shared
            .lock()
            .expect("microphone accumulator poisoned")
            .drain(out);
    }
}

impl Drop for MicrophoneSource {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop.store(true, Ordering::SeqCst);
            let _ = worker.join();
        }
    }
}
