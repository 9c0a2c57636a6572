//! # Stream Framer
//!
//! Turns arbitrary socket reads into complete packages using a fixed-capacity
//! ring buffer.
//!
//! ```text
//!            read_pos            write_pos
//!               │                    │
//! [.....free....|##### available ####|.....free.....]
//!                                    ╰─ wraps to 0 ─╯
//! ```
//!
//! The number of unread bytes is tracked explicitly in `available`, so a
//! full buffer and an empty buffer are never confused and no offset is ever
//! computed as a signed difference.
//!
//! A partial package is not an error: draining stops and waits for more
//! bytes. A declared size below the header size, or above the buffer
//! capacity, can never be satisfied and poisons the framer until
//! [`Framer::reset`]; the protocol has no resynchronization marker.
//!
//! The framer must be driven by a single producer per connection.

use crate::config::{DEFAULT_FRAMER_CAPACITY, HEADER_SIZE};
use crate::core::header::RequestResponseHeader;
use crate::core::wire::{WireDecode, WireEncode};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::package_type::PackageType;
use crate::utils::metrics::global_metrics;
use bytes::{Bytes, BytesMut};
use std::borrow::Cow;
use tracing::{trace, warn};

/// One complete package: header plus exactly `header.size() - 8` payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPackage {
    pub header: RequestResponseHeader,
    pub payload: Bytes,
}

impl ReceivedPackage {
    pub fn package_type(&self) -> PackageType {
        self.header.package_type()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Re-assemble the wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.header.to_bytes();
        out.extend_from_slice(&self.payload);
        out
    }
}

#[derive(Debug)]
pub struct Framer {
    buffer: Box<[u8]>,
    write_pos: usize,
    read_pos: usize,
    available: usize,
    poisoned: bool,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMER_CAPACITY)
    }
}

impl Framer {
    /// Ring buffer of `capacity` bytes; never smaller than one header.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity.max(HEADER_SIZE)].into_boxed_slice(),
            write_pos: 0,
            read_pos: 0,
            available: 0,
            poisoned: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Unread bytes currently buffered.
    pub fn available(&self) -> usize {
        self.available
    }

    pub fn free_space(&self) -> usize {
        self.capacity() - self.available
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Drop all buffered bytes and clear the corruption flag.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
        self.available = 0;
        self.poisoned = false;
    }

    /// Append `chunk` and hand every completed package to `sink`.
    ///
    /// Returns the number of packages emitted. A chunk that does not fit in
    /// the free space is rejected whole with `CapacityExceeded`, leaving the
    /// buffer untouched.
    pub fn on_bytes_received<F>(&mut self, chunk: &[u8], mut sink: F) -> Result<usize>
    where
        F: FnMut(ReceivedPackage),
    {
        if self.poisoned {
            return Err(ProtocolError::ProtocolCorruption(Cow::Borrowed(
                constants::ERR_FRAMER_POISONED,
            )));
        }
        if chunk.len() > self.free_space() {
            return Err(ProtocolError::capacity(
                "framer buffer",
                self.free_space(),
                chunk.len(),
            ));
        }

        self.write(chunk);
        self.drain(&mut sink)
    }

    /// Collecting form of [`on_bytes_received`](Self::on_bytes_received).
    ///
    /// All or nothing: when a later header in `chunk` is corrupt, packages
    /// framed before it are dropped along with the error. Use the callback
    /// form to keep them.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<ReceivedPackage>> {
        let mut packages = Vec::new();
        self.on_bytes_received(chunk, |package| packages.push(package))?;
        Ok(packages)
    }

    fn write(&mut self, chunk: &[u8]) {
        let capacity = self.capacity();
        let first = chunk.len().min(capacity - self.write_pos);
        self.buffer[self.write_pos..self.write_pos + first].copy_from_slice(&chunk[..first]);
        let rest = chunk.len() - first;
        self.buffer[..rest].copy_from_slice(&chunk[first..]);

        self.write_pos = (self.write_pos + chunk.len()) % capacity;
        self.available += chunk.len();
    }

    /// Copy `out.len()` bytes starting `offset` bytes past the read cursor.
    fn peek(&self, offset: usize, out: &mut [u8]) {
        let capacity = self.capacity();
        let start = (self.read_pos + offset) % capacity;
        let first = out.len().min(capacity - start);
        out[..first].copy_from_slice(&self.buffer[start..start + first]);
        let rest = out.len() - first;
        out[first..].copy_from_slice(&self.buffer[..rest]);
    }

    fn corrupted(&mut self, reason: &'static str, declared: usize) -> ProtocolError {
        self.poisoned = true;
        global_metrics().protocol_error();
        warn!(
            declared_size = declared,
            capacity = self.capacity(),
            reason,
            "Stream corruption detected"
        );
        ProtocolError::ProtocolCorruption(Cow::Borrowed(reason))
    }

    fn drain<F>(&mut self, sink: &mut F) -> Result<usize>
    where
        F: FnMut(ReceivedPackage),
    {
        let mut emitted = 0;

        while self.available >= HEADER_SIZE {
            let mut raw = [0u8; HEADER_SIZE];
            self.peek(0, &mut raw);
            let header = RequestResponseHeader::decode(&raw)?;
            let size = header.size();

            if size < HEADER_SIZE {
                return Err(self.corrupted(constants::ERR_HEADER_TOO_SMALL, size));
            }
            if size > self.capacity() {
                return Err(self.corrupted(constants::ERR_HEADER_EXCEEDS_BUFFER, size));
            }
            if size > self.available {
                trace!(
                    declared_size = size,
                    available = self.available,
                    "Waiting for rest of package"
                );
                break;
            }

            let mut payload = BytesMut::zeroed(size - HEADER_SIZE);
            self.peek(HEADER_SIZE, &mut payload);
            self.read_pos = (self.read_pos + size) % self.capacity();
            self.available -= size;

            trace!(
                package_type = header.package_type().name(),
                size,
                "Package framed"
            );
            global_metrics().package_received();
            sink(ReceivedPackage {
                header,
                payload: payload.freeze(),
            });
            emitted += 1;
        }

        Ok(emitted)
    }
}
