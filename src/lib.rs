//! # qubic-protocol
//!
//! Client-side protocol engine for the Qubic network.
//!
//! - [`core`]: package header, ring-buffer framer, wire codec and builder
//! - [`crypto`]: seed, key and identity derivation over injected hash and
//!   signature capabilities
//! - [`types`]: fixed-layout network structures and transaction payloads
//! - [`protocol`]: package type table and dispatcher
//! - [`transport`]: tokio TCP connector
//!
//! ```no_run
//! use qubic_protocol::config::NetworkConfig;
//! use qubic_protocol::transport::Connector;
//!
//! # async fn run() -> qubic_protocol::error::Result<()> {
//! let connector = Connector::new(&NetworkConfig::from_env()?);
//! connector.dispatcher().on_tick(|tick| println!("tick {tick}"))?;
//! connector.connect().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;
pub mod utils;

pub use crate::core::framer::{Framer, ReceivedPackage};
pub use crate::core::header::RequestResponseHeader;
pub use crate::crypto::{Crypto, Hasher, KeyPair, Signer};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{Dispatcher, PackageType};
