//! # Package Dispatcher
//!
//! Routes framed packages to registered handlers.
//!
//! - `RespondCurrentTickInfo` is decoded to [`TickInfo`]; the tick is
//!   committed and tick handlers notified only when it is strictly greater
//!   than the committed one.
//! - `RespondEntity` is decoded to [`EntityResponse`] and delivered to every
//!   balance handler, without deduplication.
//! - Every package, typed or not, is then forwarded raw to package handlers.
//!
//! A known type whose payload has the wrong size is logged, counted as a
//! protocol error and skipped for typed handlers only.
//!
//! Handlers run synchronously on the dispatching task and must not register
//! further handlers from inside a callback.

use crate::core::framer::ReceivedPackage;
use crate::core::wire::WireDecode;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::package_type::PackageType;
use crate::types::entity::EntityResponse;
use crate::types::tick_info::TickInfo;
use crate::utils::metrics::global_metrics;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

type TickHandler = dyn Fn(u32) + Send + Sync + 'static;
type BalanceHandler = dyn Fn(&EntityResponse) + Send + Sync + 'static;
type PackageHandler = dyn Fn(&ReceivedPackage) + Send + Sync + 'static;

/// Committed-tick sentinel; real ticks are `u32`.
const NO_TICK: u64 = u64::MAX;

#[derive(Default)]
struct Handlers {
    tick: Vec<Box<TickHandler>>,
    balance: Vec<Box<BalanceHandler>>,
    any: Vec<Box<PackageHandler>>,
    by_type: HashMap<PackageType, Vec<Box<PackageHandler>>>,
}

/// Cheap to clone; clones share handlers and the committed tick.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<Handlers>>,
    current_tick: Arc<AtomicU64>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("current_tick", &self.current_tick())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Handlers::default())),
            current_tick: Arc::new(AtomicU64::new(NO_TICK)),
        }
    }

    fn write_handlers(&self) -> Result<std::sync::RwLockWriteGuard<'_, Handlers>> {
        self.handlers.write().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.to_string())
        })
    }

    /// Called with each newly committed tick.
    pub fn on_tick<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.write_handlers()?.tick.push(Box::new(handler));
        Ok(())
    }

    /// Called with every decoded balance response.
    pub fn on_balance<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&EntityResponse) + Send + Sync + 'static,
    {
        self.write_handlers()?.balance.push(Box::new(handler));
        Ok(())
    }

    /// Called with every package.
    pub fn on_package<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&ReceivedPackage) + Send + Sync + 'static,
    {
        self.write_handlers()?.any.push(Box::new(handler));
        Ok(())
    }

    /// Called with every package of `package_type`.
    pub fn register<F>(&self, package_type: PackageType, handler: F) -> Result<()>
    where
        F: Fn(&ReceivedPackage) + Send + Sync + 'static,
    {
        self.write_handlers()?
            .by_type
            .entry(package_type)
            .or_default()
            .push(Box::new(handler));
        Ok(())
    }

    /// Last committed tick, `None` until the first tick-info response.
    pub fn current_tick(&self) -> Option<u32> {
        match self.current_tick.load(Ordering::Acquire) {
            NO_TICK => None,
            tick => u32::try_from(tick).ok(),
        }
    }

    /// Forget the committed tick.
    pub fn reset(&self) {
        self.current_tick.store(NO_TICK, Ordering::Release);
    }

    /// Commit `tick` if it is strictly greater than the committed tick.
    fn commit_tick(&self, tick: u32) -> bool {
        let tick = u64::from(tick);
        self.current_tick
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current == NO_TICK || tick > current).then_some(tick)
            })
            .is_ok()
    }

    /// Route one package to its handlers.
    pub fn dispatch(&self, package: &ReceivedPackage) -> Result<()> {
        let handlers = self.handlers.read().map_err(|_| {
            ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.to_string())
        })?;

        match package.package_type() {
            PackageType::RespondCurrentTickInfo => match TickInfo::decode(package.payload()) {
                Ok(info) => {
                    if self.commit_tick(info.tick) {
                        debug!(tick = info.tick, epoch = info.epoch, "Tick committed");
                        global_metrics().tick_committed();
                        handlers.tick.iter().for_each(|handler| handler(info.tick));
                    } else {
                        debug!(
                            tick = info.tick,
                            current = ?self.current_tick(),
                            "Stale tick dropped"
                        );
                        global_metrics().stale_tick();
                    }
                }
                Err(e) => reject(package, &e),
            },
            PackageType::RespondEntity => match EntityResponse::decode(package.payload()) {
                Ok(response) => {
                    debug!(
                        tick = response.tick,
                        balance = response.balance(),
                        "Balance received"
                    );
                    global_metrics().balance_received();
                    handlers
                        .balance
                        .iter()
                        .for_each(|handler| handler(&response));
                }
                Err(e) => reject(package, &e),
            },
            _ => {}
        }

        if let Some(typed) = handlers.by_type.get(&package.package_type()) {
            typed.iter().for_each(|handler| handler(package));
        }
        handlers.any.iter().for_each(|handler| handler(package));
        Ok(())
    }
}

fn reject(package: &ReceivedPackage, error: &ProtocolError) {
    global_metrics().protocol_error();
    warn!(
        package_type = package.package_type().name(),
        payload_size = package.payload.len(),
        error = %error,
        "Malformed payload skipped"
    );
}
