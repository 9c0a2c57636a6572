//! # Core Protocol Components
//!
//! Framing, wire encoding and package assembly.
//!
//! ## Components
//! - **Wire**: fixed-layout encode/decode contract
//! - **Header**: the 8-byte request/response header
//! - **Framer**: ring-buffer stream demultiplexer
//! - **Codec**: Tokio codec for contiguous buffers
//! - **Builder**: outbound package assembly and signing
//!
//! ## Wire Format
//! ```text
//! [Size(3, LE)] [Type(1)] [DejaVu(4, LE)] [Payload(Size - 8)]
//! ```
//!
//! Size counts the header itself and is capped at 16,777,215 bytes.

pub mod builder;
pub mod codec;
pub mod framer;
pub mod header;
pub mod wire;
