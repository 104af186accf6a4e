//! Crate-wide error type.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants
//! follow the failure taxonomy of the seeding and persistence pipeline:
//! load-side failures (`FileNotFound`, `Decryption`, `MalformedState`),
//! key handling (`InvalidKeyLength`), entropy admission
//! (`InsufficientEntropy`, `Device`), and output gating (`NotInitialized`).

use std::io;

use thiserror::Error;

/// Errors produced by the random pool, its engine, and the seed pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Output was requested before a successful seeding or state load.
    #[error("generator has not been seeded or restored")]
    NotInitialized,

    /// A state load was attempted but the file does not exist. Callers
    /// typically treat this as "need to seed".
    #[error("state file not found: {0}")]
    FileNotFound(String),

    /// Ciphertext or tag failed to authenticate. Not recoverable without
    /// the correct key.
    #[error("state file failed to authenticate under the supplied key")]
    Decryption,

    /// A nonempty key of the wrong length was supplied.
    #[error("encryption key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// A source sample or a hash split fell below the admission threshold.
    #[error("entropy below admission threshold: {0}")]
    InsufficientEntropy(&'static str),

    /// A physical entropy source could not be opened or failed mid-capture.
    #[error("entropy source failure: {0}")]
    Device(String),

    /// A state file decoded but did not parse as a serialized engine.
    #[error("malformed state file: {0}")]
    MalformedState(String),

    /// Seed assembler used out of order (copy before finalize, or more
    /// data offered while a finalized seed is pending).
    #[error("seed assembler: {0}")]
    SeedState(&'static str),

    /// File I/O failure during save or load.
    #[error("state file I/O: {0}")]
    Storage(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_key_length() {
        let msg = Error::InvalidKeyLength(7).to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        match err {
            Error::Storage(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("expected Storage, got {other:?}"),
        }
    }
}
