//! Connection lifecycle for the streaming channel: a single background task
//! owns the transport, the heartbeat timer, and the reconnection policy, and
//! feeds inbound frames to the store strictly in arrival order.

pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::config::WsConfig;
use crate::error::SyncError;
use crate::protocol;
use crate::store::SeatStoreHandle;
use crate::SyncContext;

use transport::{Connector, Transport, WsConnector};

/// Owned exclusively by the connection task; everything else observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
enum Command {
    Connect,
    Disconnect,
    Send {
        msg_type: String,
        payload: Option<Value>,
    },
}

/// Reconnect and heartbeat policy, derived from [`WsConfig`].
#[derive(Debug, Clone)]
pub(crate) struct ConnectionPolicy {
    heartbeat_interval: Duration,
    reconnect_delay: Duration,
    max_reconnect_attempts: u32,
    connect_timeout: Duration,
}

impl From<&WsConfig> for ConnectionPolicy {
    fn from(config: &WsConfig) -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            max_reconnect_attempts: config.max_reconnect_attempts,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

/// Cloneable handle to the background connection task. All methods are
/// non-blocking and never return an error to the caller; failures surface
/// through [`ConnectionManager::state`].
#[derive(Clone)]
pub struct ConnectionManager {
    command_tx: mpsc::Sender<Command>,
    state: Arc<RwLock<ConnectionState>>,
}

impl ConnectionManager {
    /// Spawn the connection task for the given context. The transport is
    /// keyed by session id and local user identity.
    pub fn start(ctx: &SyncContext, store: SeatStoreHandle) -> Self {
        let connector = WsConnector::new(&ctx.config.ws, &ctx.session_id, &ctx.identity.id);
        Self::start_with(connector, (&ctx.config.ws).into(), store)
    }

    pub(crate) fn start_with<C: Connector>(
        connector: C,
        policy: ConnectionPolicy,
        store: SeatStoreHandle,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);
        let state = Arc::new(RwLock::new(ConnectionState::Disconnected));

        tokio::spawn(connection_loop(
            connector,
            policy,
            store,
            Arc::clone(&state),
            command_rx,
        ));

        Self { command_tx, state }
    }

    /// Ask the task to establish a connection. No-op while already
    /// connected.
    pub async fn connect(&self) {
        let _ = self.command_tx.send(Command::Connect).await;
    }

    /// Planned close: suppresses auto-reconnect and cancels a pending
    /// retry.
    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(Command::Disconnect).await;
    }

    /// Fire-and-forget outbound message; silently dropped unless connected.
    pub async fn send(&self, msg_type: &str, payload: Option<Value>) {
        let _ = self
            .command_tx
            .send(Command::Send {
                msg_type: msg_type.to_string(),
                payload,
            })
            .await;
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }
}

enum SessionEnd {
    /// Transport dropped or errored; auto-reconnect applies.
    Dropped,
    /// Explicit disconnect; stay down until the next explicit connect.
    Planned,
    /// All handles gone; the task exits.
    Shutdown,
}

async fn set_state(state: &Arc<RwLock<ConnectionState>>, next: ConnectionState) {
    *state.write().await = next;
    debug!(state = ?next, "connection state");
}

async fn connection_loop<C: Connector>(
    connector: C,
    policy: ConnectionPolicy,
    store: SeatStoreHandle,
    state: Arc<RwLock<ConnectionState>>,
    mut command_rx: mpsc::Receiver<Command>,
) {
    // Consecutive failed attempts since the last successful connection.
    let mut attempts: u32 = 0;

    loop {
        // Idle until the collaborator layer explicitly asks to connect.
        match command_rx.recv().await {
            Some(Command::Connect) => {}
            Some(Command::Disconnect) => continue,
            Some(Command::Send { msg_type, .. }) => {
                debug!(%msg_type, "dropping outbound message while disconnected");
                continue;
            }
            None => return,
        }

        'attempts: loop {
            set_state(&state, ConnectionState::Connecting).await;

            let connected = time::timeout(policy.connect_timeout, connector.connect())
                .await
                .map_err(|_| SyncError::ConnectTimeout(policy.connect_timeout))
                .and_then(|result| result);

            match connected {
                Ok(transport) => {
                    attempts = 0;
                    set_state(&state, ConnectionState::Connected).await;
                    info!("🔌 connected to seat update channel");

                    let end = run_session(transport, &policy, &store, &mut command_rx).await;
                    set_state(&state, ConnectionState::Disconnected).await;

                    match end {
                        SessionEnd::Planned => break 'attempts,
                        SessionEnd::Shutdown => return,
                        SessionEnd::Dropped => info!("🔌 connection dropped"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to connect");
                    set_state(&state, ConnectionState::Disconnected).await;
                }
            }

            attempts += 1;
            if attempts >= policy.max_reconnect_attempts {
                warn!(attempts, "giving up on automatic reconnection");
                break 'attempts;
            }
            info!(
                attempt = attempts,
                max = policy.max_reconnect_attempts,
                delay = ?policy.reconnect_delay,
                "scheduling reconnect"
            );

            // Fixed-delay retry, cancelable by an explicit disconnect.
            let retry = time::sleep(policy.reconnect_delay);
            tokio::pin!(retry);
            loop {
                tokio::select! {
                    _ = &mut retry => continue 'attempts,
                    cmd = command_rx.recv() => match cmd {
                        // Explicit connect overrides the pending retry.
                        Some(Command::Connect) => continue 'attempts,
                        Some(Command::Disconnect) => break 'attempts,
                        Some(Command::Send { msg_type, .. }) => {
                            debug!(%msg_type, "dropping outbound message while disconnected");
                        }
                        None => return,
                    },
                }
            }
        }
    }
}

enum Action {
    Inbound(Option<Result<String, SyncError>>),
    Heartbeat,
    Cmd(Option<Command>),
}

/// Drive one established connection until it ends. Inbound frames are
/// dispatched inline, one at a time, so updates land in arrival order.
async fn run_session(
    mut transport: Box<dyn Transport>,
    policy: &ConnectionPolicy,
    store: &SeatStoreHandle,
    command_rx: &mut mpsc::Receiver<Command>,
) -> SessionEnd {
    // Liveness pings keep intermediaries from idling the connection; the
    // first one goes out a full interval after connect.
    let mut heartbeat = time::interval_at(
        Instant::now() + policy.heartbeat_interval,
        policy.heartbeat_interval,
    );

    loop {
        let action = tokio::select! {
            frame = transport.recv() => Action::Inbound(frame),
            _ = heartbeat.tick() => Action::Heartbeat,
            cmd = command_rx.recv() => Action::Cmd(cmd),
        };

        match action {
            Action::Inbound(Some(Ok(text))) => protocol::dispatch(store, &text),
            Action::Inbound(Some(Err(e))) => {
                warn!(error = %e, "websocket error");
                return SessionEnd::Dropped;
            }
            Action::Inbound(None) => {
                info!("server closed the connection");
                return SessionEnd::Dropped;
            }
            Action::Heartbeat => {
                let frame = protocol::client_frame(protocol::PING, None);
                if let Err(e) = transport.send(frame).await {
                    warn!(error = %e, "heartbeat send failed");
                    return SessionEnd::Dropped;
                }
            }
            Action::Cmd(Some(Command::Send { msg_type, payload })) => {
                let frame = protocol::client_frame(&msg_type, payload.as_ref());
                if let Err(e) = transport.send(frame).await {
                    warn!(error = %e, "send failed");
                    return SessionEnd::Dropped;
                }
            }
            // Already connected.
            Action::Cmd(Some(Command::Connect)) => {}
            Action::Cmd(Some(Command::Disconnect)) => {
                transport.close().await;
                return SessionEnd::Planned;
            }
            Action::Cmd(None) => {
                transport.close().await;
                return SessionEnd::Shutdown;
            }
        }
    }
}
