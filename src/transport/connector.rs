//! # Peer Connector
//!
//! Thin tokio TCP shell around the framer and dispatcher.
//!
//! One receive task owns the [`Framer`] and dispatches synchronously; one
//! poll task requests the current tick info at a fixed interval. Writes from
//! the poll task and from callers share a mutex-guarded
//! `FramedWrite<_, PackageCodec>`. Failures are surfaced to the caller and
//! never retried.
//!
//! Every connection owns a [`CancellationToken`]. Whichever side ends the
//! connection first (the caller or the receive task) cancels it under the
//! writer lock, drops the writer and forgets the committed tick.

use crate::config::NetworkConfig;
use crate::core::builder::{self, tick_info_request};
use crate::core::codec::PackageCodec;
use crate::core::framer::Framer;
use crate::error::{ProtocolError, Result};
use crate::protocol::dispatcher::Dispatcher;
use crate::types::public_key::PublicKey;
use crate::types::transaction::Transaction;
use crate::utils::metrics::{global_metrics, Timer};
use bytes::Bytes;
use futures::SinkExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration, MissedTickBehavior};
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

type PackageWriter = FramedWrite<OwnedWriteHalf, PackageCodec>;
type SharedWriter = Arc<Mutex<Option<PackageWriter>>>;

/// Connection lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected { peer: String },
    Disconnected { reason: String },
}

/// Tasks and shutdown signal of the current connection.
#[derive(Default)]
struct Session {
    tasks: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl Session {
    fn stop(&mut self) {
        self.shutdown.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// State shared between the connector and its receive task.
#[derive(Clone)]
struct Link {
    writer: SharedWriter,
    dispatcher: Dispatcher,
    connected: Arc<AtomicBool>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl Link {
    /// Drop the writer and the committed tick unless `shutdown` was already
    /// cancelled by someone else. Returns whether this call did the teardown.
    async fn tear_down(&self, shutdown: &CancellationToken) -> bool {
        let mut writer = self.writer.lock().await;
        if shutdown.is_cancelled() {
            return false;
        }
        shutdown.cancel();
        writer.take();
        self.dispatcher.reset();
        self.connected.swap(false, Ordering::AcqRel)
    }
}

pub struct Connector {
    config: NetworkConfig,
    link: Link,
    session: Mutex<Session>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("peer", &self.config.client.address())
            .field("connected", &self.is_connected())
            .field("dispatcher", &self.link.dispatcher)
            .finish_non_exhaustive()
    }
}

impl Connector {
    pub fn new(config: &NetworkConfig) -> Self {
        Self::with_dispatcher(config, Dispatcher::new())
    }

    /// Use an existing dispatcher, e.g. one with handlers already registered.
    pub fn with_dispatcher(config: &NetworkConfig, dispatcher: Dispatcher) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            config: config.clone(),
            link: Link {
                writer: Arc::new(Mutex::new(None)),
                dispatcher,
                connected: Arc::new(AtomicBool::new(false)),
                events,
            },
            session: Mutex::new(Session::default()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.link.dispatcher
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.link.events.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.link.connected.load(Ordering::Acquire)
    }

    /// Last tick committed on this connection.
    pub fn current_tick(&self) -> Option<u32> {
        self.link.dispatcher.current_tick()
    }

    /// Open the TCP connection and start the receive and tick-poll tasks.
    /// A no-op when already connected. Fails with `ConfigError` when the
    /// configuration does not validate.
    #[instrument(skip(self), fields(peer = %self.config.client.address()))]
    pub async fn connect(&self) -> Result<()> {
        self.config.validate_strict()?;

        let mut session = self.session.lock().await;
        if self.is_connected() {
            debug!("Already connected");
            return Ok(());
        }
        // Leftovers from a connection the peer closed.
        session.stop();
        self.link.dispatcher.reset();

        let client = &self.config.client;
        let capacity = self.config.framer.buffer_capacity;
        let address = client.address();
        let stream = {
            let _timer = Timer::start("connect");
            match timeout(client.connection_timeout, TcpStream::connect(&address)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    global_metrics().connection_error();
                    warn!(error = %e, "Connection failed");
                    return Err(ProtocolError::TransportFailure(format!(
                        "Failed to connect to {address}: {e}"
                    )));
                }
                Err(_) => {
                    global_metrics().connection_error();
                    warn!("Connection attempt timed out");
                    return Err(ProtocolError::Timeout);
                }
            }
        };
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        let shutdown = CancellationToken::new();
        *self.link.writer.lock().await =
            Some(FramedWrite::new(write_half, PackageCodec::new(capacity)));
        self.link.connected.store(true, Ordering::Release);

        session.tasks.push(tokio::spawn(receive_loop(
            read_half,
            Framer::new(capacity),
            client.read_chunk_size,
            self.link.clone(),
            shutdown.clone(),
        )));
        session.tasks.push(tokio::spawn(poll_loop(
            Arc::clone(&self.link.writer),
            client.write_timeout,
            client.tick_poll_interval,
            shutdown.clone(),
        )));
        session.shutdown = shutdown;

        global_metrics().connection_established();
        info!("Connected to peer");
        let _ = self.link.events.send(ConnectionEvent::Connected { peer: address });
        Ok(())
    }

    /// Stop both tasks, drop the socket and forget the committed tick.
    #[instrument(skip(self), fields(peer = %self.config.client.address()))]
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        let was_connected = self.link.tear_down(&session.shutdown).await;
        session.stop();

        if was_connected {
            global_metrics().connection_closed();
            info!("Disconnected from peer");
            let _ = self.link.events.send(ConnectionEvent::Disconnected {
                reason: "disconnect requested".to_string(),
            });
        }
    }

    /// Tear down and connect again with a fresh framer.
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await;
        self.connect().await
    }

    /// Write one assembled package (header included).
    pub async fn send_package(&self, package: Bytes) -> Result<()> {
        if !self.is_connected() {
            return Err(ProtocolError::NotConnected);
        }
        write_package(&self.link.writer, self.config.client.write_timeout, package).await
    }

    pub async fn request_tick_info(&self) -> Result<()> {
        self.send_package(tick_info_request()?).await
    }

    pub async fn request_balance(&self, public_key: &PublicKey) -> Result<()> {
        self.send_package(builder::entity_request(public_key)?).await
    }

    /// Broadcast a built transaction. Fails with `NotBuilt` otherwise.
    #[instrument(skip_all)]
    pub async fn broadcast_transaction(&self, transaction: &Transaction) -> Result<()> {
        let package = builder::broadcast_transaction(transaction)?;
        self.send_package(package).await?;
        if let Ok(id) = transaction.id() {
            info!(transaction = %id, "Transaction broadcast");
        }
        Ok(())
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        self.session.get_mut().stop();
    }
}

async fn write_package(writer: &SharedWriter, limit: Duration, package: Bytes) -> Result<()> {
    let mut guard = writer.lock().await;
    let sink = guard.as_mut().ok_or(ProtocolError::NotConnected)?;
    let size = package.len();

    match timeout(limit, sink.send(package)).await {
        Ok(Ok(())) => {
            global_metrics().package_sent(size as u64);
            debug!(size, "Package sent");
            Ok(())
        }
        Ok(Err(e)) => {
            global_metrics().connection_error();
            Err(e)
        }
        Err(_) => {
            global_metrics().connection_error();
            Err(ProtocolError::Timeout)
        }
    }
}

async fn receive_loop(
    mut reader: OwnedReadHalf,
    mut framer: Framer,
    chunk_size: usize,
    link: Link,
    shutdown: CancellationToken,
) {
    let mut chunk = vec![0u8; chunk_size.max(1)];

    let reason = loop {
        // A drained framer always has free space: any buffered partial
        // package is smaller than the capacity.
        let limit = chunk.len().min(framer.free_space());
        let read = match reader.read(&mut chunk[..limit]).await {
            Ok(0) => break ProtocolError::ConnectionClosed.to_string(),
            Ok(n) => n,
            Err(e) => {
                global_metrics().connection_error();
                break format!("read failed: {e}");
            }
        };
        global_metrics().bytes_read(read as u64);

        let framed = framer.on_bytes_received(&chunk[..read], |package| {
            if let Err(e) = link.dispatcher.dispatch(&package) {
                warn!(error = %e, "Dispatch failed");
            }
        });
        if let Err(e) = framed {
            break format!("framing failed: {e}");
        }
    };

    if link.tear_down(&shutdown).await {
        global_metrics().connection_closed();
        warn!(reason = %reason, "Connection lost");
        let _ = link.events.send(ConnectionEvent::Disconnected { reason });
    }
}

async fn poll_loop(
    writer: SharedWriter,
    write_timeout: Duration,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Tick poll cancelled");
                return;
            }
            _ = interval.tick() => {}
        }
        let request = match tick_info_request() {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to build tick info request");
                return;
            }
        };
        if let Err(e) = write_package(&writer, write_timeout, request).await {
            warn!(error = %e, "Tick poll stopped");
            return;
        }
    }
}
