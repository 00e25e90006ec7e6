//! Gateway configuration types.
//!
//! Router settings live under the `router` prefix of the configuration store
//! and queue transport settings under `queues`. Both are loaded at startup,
//! falling back to the command-line defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use shardgate_core::{PartitionStrategy, PartitionTable};

/// Store prefix for [`GatewayConfig`].
pub const ROUTER_SETTINGS_PREFIX: &str = "router";

/// Store prefix for [`QueueSettings`].
pub const QUEUE_SETTINGS_PREFIX: &str = "queues";

/// Router settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen port.
    #[serde(default = "GatewayConfig::default_port")]
    pub port: u16,

    /// Time allowed for a client to send request headers, in seconds.
    #[serde(default = "GatewayConfig::default_read_timeout")]
    pub read_timeout_seconds: u64,

    /// Time allowed to produce a response, in seconds.
    #[serde(default = "GatewayConfig::default_write_timeout")]
    pub write_timeout_seconds: u64,

    /// Maximum concurrently accepted connections; `<= 0` disables the cap.
    #[serde(default = "GatewayConfig::default_connections_limit")]
    pub connections_limit: i64,

    /// Bound on a single queue dispatch, in seconds.
    #[serde(default = "GatewayConfig::default_dispatch_timeout")]
    pub dispatch_timeout_seconds: u64,

    /// Graceful shutdown deadline, in seconds.
    #[serde(default = "GatewayConfig::default_drain_timeout")]
    pub drain_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Active partition strategy.
    #[serde(default)]
    pub partition_strategy: PartitionStrategy,

    /// Alias → partition count.
    #[serde(default = "GatewayConfig::default_partitions")]
    pub partitions: PartitionTable,
}

impl GatewayConfig {
    const fn default_port() -> u16 {
        8822
    }

    const fn default_read_timeout() -> u64 {
        10
    }

    const fn default_write_timeout() -> u64 {
        10
    }

    const fn default_connections_limit() -> i64 {
        10_000
    }

    const fn default_dispatch_timeout() -> u64 {
        10
    }

    const fn default_drain_timeout() -> u64 {
        15
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    /// The queues served by a fresh deployment.
    #[must_use]
    pub fn default_partitions() -> PartitionTable {
        PartitionTable::builder()
            .queue("air-bo-view", 0)
            .queue("air-bo", 10)
            .queue("manifest", 0)
            .build()
    }

    /// Header read timeout as a `Duration`.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    /// Response timeout as a `Duration`.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    /// Dispatch bound as a `Duration`.
    #[must_use]
    pub const fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_seconds)
    }

    /// Drain deadline as a `Duration`.
    #[must_use]
    pub const fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_seconds)
    }

    /// The connection cap, if enabled.
    #[must_use]
    pub fn connection_cap(&self) -> Option<usize> {
        usize::try_from(self.connections_limit)
            .ok()
            .filter(|limit| *limit > 0)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            read_timeout_seconds: Self::default_read_timeout(),
            write_timeout_seconds: Self::default_write_timeout(),
            connections_limit: Self::default_connections_limit(),
            dispatch_timeout_seconds: Self::default_dispatch_timeout(),
            drain_timeout_seconds: Self::default_drain_timeout(),
            max_body_bytes: Self::default_max_body(),
            partition_strategy: PartitionStrategy::default(),
            partitions: Self::default_partitions(),
        }
    }
}

/// Queue transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Remote queue servers; empty selects the in-process queues.
    #[serde(default)]
    pub servers: Vec<String>,
}
