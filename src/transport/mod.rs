//! Network transport.

pub mod connector;

pub use connector::{ConnectionEvent, Connector};
