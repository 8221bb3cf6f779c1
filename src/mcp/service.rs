//! MCP connection lifecycle and tool execution.
//!
//! [`McpService`] owns the connection state and the registered tool set.
//! Connecting runs an API health check; only a `status` of exactly `"ok"`
//! registers the tools. All methods take `&self`, so the service can be shared
//! through an `Arc` between the keep-alive loop and other threads.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::shutdown::ShutdownSignal;
use super::tools::{self, ToolCall, ToolError, ToolKind, ToolOutput, ToolParams};
use crate::api::{ApiData, ApiError, PlugixClient};
use crate::catalog::Catalog;
use crate::core::config::McpConfig;

/// Upper bound on how long the keep-alive loop sleeps between checks.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// MCP is disabled in configuration; never connects
    Disabled,
    /// Enabled but not connected
    Disconnected,
    /// Health check passed and tools are registered
    Connected,
}

/// Why the keep-alive loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown signal fired
    Stopped,
    /// `disconnect()` was called
    Disconnected,
    /// A liveness probe failed and reconnecting is off
    ConnectionLost,
}

/// Error type for MCP operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("MCP is disabled")]
    Disabled,

    #[error("API health check failed (status: {status})")]
    HealthCheck { status: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("MCP not connected")]
    NotConnected,

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Lifecycle settings.
#[derive(Debug, Clone)]
pub struct McpSettings {
    /// Whether MCP may connect at all
    pub enabled: bool,
    /// Reconnect after a failed liveness probe
    pub auto_connect: bool,
    /// Liveness probe / reconnect period
    pub reconnect_interval: Duration,
    /// Loop wake-up period, capped at [`MAX_POLL_INTERVAL`]
    pub poll_interval: Duration,
}

impl McpSettings {
    /// Settings from the `[mcp]` config section.
    pub fn from_config(config: &McpConfig) -> Self {
        Self {
            enabled: config.enabled,
            auto_connect: config.auto_connect,
            reconnect_interval: config.reconnect_interval(),
            poll_interval: MAX_POLL_INTERVAL,
        }
    }
}

impl Default for McpSettings {
    fn default() -> Self {
        Self::from_config(&McpConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisconnectCause {
    Requested,
    LivenessLost,
}

#[derive(Debug)]
struct Connection {
    state: ConnectionState,
    tools: Vec<ToolKind>,
    cause: DisconnectCause,
    generation: u64,
}

/// MCP service bridging the catalog tools to the Plugix API.
pub struct McpService {
    client: PlugixClient,
    catalog: Arc<dyn Catalog>,
    settings: McpSettings,
    connection: Mutex<Connection>,
    /// Serializes connect/disconnect
    lifecycle: Mutex<()>,
}

impl McpService {
    /// Create a service. Starts `Disabled` or `Disconnected`.
    pub fn new(client: PlugixClient, catalog: Arc<dyn Catalog>, settings: McpSettings) -> Self {
        let state =
            if settings.enabled { ConnectionState::Disconnected } else { ConnectionState::Disabled };

        Self {
            client,
            catalog,
            settings,
            connection: Mutex::new(Connection {
                state,
                tools: Vec::new(),
                cause: DisconnectCause::Requested,
                generation: 0,
            }),
            lifecycle: Mutex::new(()),
        }
    }

    /// Whether MCP is enabled in configuration.
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Whether the service is connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.lock().state
    }

    /// Connect: verify API health, then register the tools.
    pub fn connect(&self) -> Result<(), McpError> {
        let _guard = self.lifecycle.lock();
        self.connect_locked()
    }

    fn connect_locked(&self) -> Result<(), McpError> {
        if !self.settings.enabled {
            return Err(McpError::Disabled);
        }

        tracing::info!("Connecting to Plugix MCP server...");

        let health = self.client.health()?;
        check_health(&health)?;

        self.register_tools();
        Ok(())
    }

    fn register_tools(&self) {
        let mut connection = self.connection.lock();
        connection.state = ConnectionState::Connected;
        connection.tools = ToolKind::ALL.to_vec();
        connection.generation += 1;

        tracing::info!(tools = connection.tools.len(), "MCP connected successfully");
    }

    /// Disconnect and clear the tool set. Idempotent.
    pub fn disconnect(&self) {
        let _guard = self.lifecycle.lock();
        self.drop_connection(DisconnectCause::Requested);
        tracing::info!("MCP disconnected");
    }

    fn drop_connection(&self, cause: DisconnectCause) {
        let mut connection = self.connection.lock();
        if connection.state == ConnectionState::Connected {
            connection.state = ConnectionState::Disconnected;
        }
        connection.tools.clear();
        connection.cause = cause;
    }

    /// Names of the registered tools, in registration order.
    pub fn available_tools(&self) -> Vec<&'static str> {
        self.connection.lock().tools.iter().map(|t| t.name()).collect()
    }

    /// Execute a tool by name.
    pub fn execute_tool(&self, name: &str, params: &ToolParams) -> Result<ToolOutput, McpError> {
        let kind = ToolKind::from_name(name).ok_or_else(|| McpError::ToolNotFound(name.into()))?;

        {
            let connection = self.connection.lock();
            if connection.state != ConnectionState::Connected {
                return Err(McpError::NotConnected);
            }
            if !connection.tools.contains(&kind) {
                return Err(McpError::ToolNotFound(name.into()));
            }
        }

        tracing::info!(tool = name, params = ?params, "Executing MCP tool");

        Ok(tools::dispatch(kind, params, self.catalog.as_ref())?)
    }

    /// Execute a [`ToolCall`].
    pub fn execute(&self, call: &ToolCall) -> Result<ToolOutput, McpError> {
        self.execute_tool(&call.name, &call.arguments)
    }

    /// Keep-alive loop.
    ///
    /// Returns once `stop` fires, `disconnect()` is called, or the API is lost
    /// with `auto_connect` off. Every `reconnect_interval` a connected service
    /// is probed with a health check; after a failed probe it retries
    /// `connect()` at the same interval when `auto_connect` is on. Health
    /// checks run on a helper thread so an in-flight request never delays
    /// stopping by more than one poll interval.
    pub fn run_loop(&self, stop: &ShutdownSignal) -> LoopExit {
        let poll = self.poll_interval();
        let mut next_probe = Instant::now() + self.settings.reconnect_interval;

        tracing::debug!(
            poll_ms = poll.as_millis() as u64,
            probe_ms = self.settings.reconnect_interval.as_millis() as u64,
            "MCP keep-alive loop started"
        );

        loop {
            if stop.is_triggered() {
                return LoopExit::Stopped;
            }

            let (state, cause) = {
                let connection = self.connection.lock();
                (connection.state, connection.cause)
            };

            if state != ConnectionState::Connected {
                match cause {
                    DisconnectCause::Requested => return LoopExit::Disconnected,
                    DisconnectCause::LivenessLost if !self.settings.auto_connect => {
                        return LoopExit::ConnectionLost;
                    }
                    DisconnectCause::LivenessLost => {}
                }
            }

            if stop.wait_timeout(poll) {
                return LoopExit::Stopped;
            }

            if Instant::now() < next_probe {
                continue;
            }
            next_probe = Instant::now() + self.settings.reconnect_interval;

            if state == ConnectionState::Connected {
                self.probe(stop);
            } else {
                self.reconnect(stop);
            }
        }
    }

    fn poll_interval(&self) -> Duration {
        self.settings.poll_interval.min(MAX_POLL_INTERVAL)
    }

    fn disconnect_requested(&self) -> bool {
        let connection = self.connection.lock();
        connection.state != ConnectionState::Connected
            && connection.cause == DisconnectCause::Requested
    }

    /// Run a health check off-thread.
    ///
    /// Returns `None` when `stop` fires or `disconnect()` is called before the
    /// check completes; the helper thread is then left to finish on its own.
    fn background_health_check(&self, stop: &ShutdownSignal) -> Option<Result<(), McpError>> {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();

        thread::spawn(move || {
            let result = client.health().map_err(McpError::from).and_then(|h| check_health(&h));
            let _ = tx.send(result);
        });

        let poll = self.poll_interval();
        loop {
            match rx.recv_timeout(poll) {
                Ok(result) => return Some(result),
                Err(RecvTimeoutError::Disconnected) => {
                    return Some(Err(McpError::HealthCheck { status: "unavailable".to_string() }));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if stop.is_triggered() || self.disconnect_requested() {
                        tracing::debug!("Abandoning in-flight MCP health check");
                        return None;
                    }
                }
            }
        }
    }

    fn probe(&self, stop: &ShutdownSignal) {
        let generation = self.connection.lock().generation;

        let error = match self.background_health_check(stop) {
            None => return,
            Some(Ok(())) => {
                tracing::debug!("MCP liveness probe ok");
                return;
            }
            Some(Err(e)) => e,
        };

        let _guard = self.lifecycle.lock();
        let current = {
            let connection = self.connection.lock();
            connection.state == ConnectionState::Connected && connection.generation == generation
        };
        if current {
            tracing::warn!(error = %error, "MCP liveness probe failed, connection dropped");
            self.drop_connection(DisconnectCause::LivenessLost);
        }
    }

    fn reconnect(&self, stop: &ShutdownSignal) {
        if self.connection.lock().cause != DisconnectCause::LivenessLost {
            return;
        }

        match self.background_health_check(stop) {
            None => {}
            Some(Err(e)) => tracing::warn!(error = %e, "MCP reconnect attempt failed"),
            Some(Ok(())) => {
                let _guard = self.lifecycle.lock();
                let still_lost = {
                    let connection = self.connection.lock();
                    connection.state == ConnectionState::Disconnected
                        && connection.cause == DisconnectCause::LivenessLost
                };
                if still_lost {
                    self.register_tools();
                    tracing::info!("MCP reconnected");
                }
            }
        }
    }
}

fn check_health(health: &ApiData) -> Result<(), McpError> {
    match health.get("status") {
        Some(serde_json::Value::String(status)) if status == "ok" => Ok(()),
        Some(serde_json::Value::String(status)) => {
            Err(McpError::HealthCheck { status: status.clone() })
        }
        Some(other) => Err(McpError::HealthCheck { status: other.to_string() }),
        None => Err(McpError::HealthCheck { status: "missing".to_string() }),
    }
}
