//! # Error Types
//!
//! Error handling for the protocol engine.
//!
//! This module defines every error variant that can surface while framing,
//! decoding, building, signing, or transporting packages.
//!
//! ## Error Categories
//! - **Codec Errors**: a fixed-size entity received the wrong number of bytes
//! - **Validation Errors**: malformed seeds or identities, oversized payloads
//! - **State Errors**: reading derived fields of a transaction before building it
//! - **Stream Errors**: protocol corruption detected by the framer
//! - **Transport Errors**: connect/write failures, reported and never retried
//!
//! Seed and identity errors name the offending position or length only and
//! never echo the input, so key material does not end up in logs.
//!
//! ## Example Usage
//! ```rust
//! use qubic_protocol::error::{ProtocolError, Result};
//! use qubic_protocol::crypto::keys::seed_to_bytes;
//! use tracing::error;
//!
//! fn check(seed: &str) -> Result<()> {
//!     seed_to_bytes(seed)?;
//!     Ok(())
//! }
//!
//! if let Err(e) = check("not-a-seed") {
//!     error!(error = %e, "Seed rejected");
//!     assert!(matches!(e, ProtocolError::InvalidSeed(_)));
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Dispatcher-related error messages
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// Framing errors
    pub const ERR_HEADER_TOO_SMALL: &str = "Declared package size is smaller than the header";
    pub const ERR_HEADER_EXCEEDS_BUFFER: &str =
        "Declared package size can never fit the receive buffer";
    pub const ERR_FRAMER_POISONED: &str = "Stream is corrupted; reset required";

    /// Seed / identity validation errors
    pub const ERR_IDENTITY_FORMAT: &str = "Identity must be 60 uppercase ASCII letters";
    pub const ERR_SYSTEM_TIME: &str = "System time error: time went backwards";

    /// Transaction errors
    pub const ERR_SOURCE_MISMATCH: &str = "Transaction source is not the signing seed's public key";
}

// ProtocolError is the primary error type for all protocol operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Invalid size for {entity}: expected {expected} bytes, got {actual}")]
    InvalidSize {
        entity: Cow<'static, str>,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid seed: {0}")]
    InvalidSeed(Cow<'static, str>),

    #[error("Invalid format: {0}")]
    InvalidFormat(Cow<'static, str>),

    #[error("Transaction must be built first")]
    NotBuilt,

    #[error("Transaction is already built")]
    AlreadyBuilt,

    #[error("Payload is already set")]
    PayloadAlreadySet,

    #[error("Capacity exceeded for {what}: max {max}, got {actual}")]
    CapacityExceeded {
        what: Cow<'static, str>,
        max: usize,
        actual: usize,
    },

    #[error("Protocol corruption: {0}")]
    ProtocolCorruption(Cow<'static, str>),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("No peer connected")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// Size mismatch for a fixed-layout entity.
    pub fn invalid_size(entity: &'static str, expected: usize, actual: usize) -> Self {
        ProtocolError::InvalidSize {
            entity: Cow::Borrowed(entity),
            expected,
            actual,
        }
    }

    /// A container was asked to hold more than it can.
    pub fn capacity(what: &'static str, max: usize, actual: usize) -> Self {
        ProtocolError::CapacityExceeded {
            what: Cow::Borrowed(what),
            max,
            actual,
        }
    }

    /// Whether this error must terminate the connection.
    ///
    /// The wire protocol has no resynchronization marker, so corruption of
    /// the stream and transport failures are fatal for the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProtocolError::ProtocolCorruption(_)
                | ProtocolError::Io(_)
                | ProtocolError::TransportFailure(_)
                | ProtocolError::ConnectionClosed
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
