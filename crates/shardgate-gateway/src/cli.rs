//! Command-line flags.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use shardgate_auth::{SubjectPolicy, DEFAULT_SECRET_ENV};
use shardgate_core::{PartitionEntry, PartitionStrategy, PartitionTable};

use crate::config::{GatewayConfig, QueueSettings};

/// Flags of the `shardgate` binary.
///
/// Router and queue flags only seed the configuration store; values already
/// stored there take precedence.
#[derive(Debug, Clone, Parser)]
#[command(name = "shardgate", version, about = "Partitioned queue gateway")]
pub struct Cli {
    /// Configuration store host.
    #[arg(short = 'c', long, env = "SHARDGATE_CONSUL_HOST", default_value = "127.0.0.1")]
    pub consul_host: IpAddr,

    /// Configuration store port.
    #[arg(long, env = "SHARDGATE_CONSUL_PORT", default_value_t = 8500)]
    pub consul_port: u16,

    /// Comma-separated queue servers; empty runs in-process queues.
    #[arg(short = 'n', long, env = "SHARDGATE_QUEUE_SERVERS", value_delimiter = ',')]
    pub queue_servers: Vec<String>,

    /// HTTP listen port.
    #[arg(short = 'p', long, env = "SHARDGATE_PORT", default_value_t = 8822)]
    pub port: u16,

    /// Response timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub write_timeout: u64,

    /// Header read timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub read_timeout: u64,

    /// Maximum concurrent connections; zero or less disables the cap.
    #[arg(long, default_value_t = 10_000, allow_negative_numbers = true)]
    pub connections_limit: i64,

    /// Bound on a single queue dispatch in seconds.
    #[arg(long, default_value_t = 10)]
    pub dispatch_timeout: u64,

    /// Graceful shutdown deadline in seconds.
    #[arg(long, default_value_t = 15)]
    pub drain_timeout: u64,

    /// Directory of the persistent configuration store.
    #[arg(long, env = "SHARDGATE_DATA_DIR", default_value = "/var/lib/shardgate")]
    pub data_dir: PathBuf,

    /// Keep configuration and accounts in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Queue partition entry `alias=count`; repeatable.
    #[arg(long = "queue", value_name = "ALIAS=COUNT")]
    pub queues: Vec<PartitionEntry>,

    /// Partition strategy: `modulo` or `fnv`.
    #[arg(long, default_value_t = PartitionStrategy::Modulo)]
    pub partition_strategy: PartitionStrategy,

    /// Token subject policy: `random` or `stable`.
    #[arg(long, default_value_t = SubjectPolicy::RandomNonce)]
    pub subject_policy: SubjectPolicy,

    /// Environment variable holding the token signing secret.
    #[arg(long, default_value = DEFAULT_SECRET_ENV)]
    pub jwt_secret_env: String,
}

impl Cli {
    /// Router settings derived from the flags.
    #[must_use]
    pub fn router_defaults(&self) -> GatewayConfig {
        let partitions = if self.queues.is_empty() {
            GatewayConfig::default_partitions()
        } else {
            self.queues.iter().cloned().collect::<PartitionTable>()
        };

        GatewayConfig {
            port: self.port,
            read_timeout_seconds: self.read_timeout,
            write_timeout_seconds: self.write_timeout,
            connections_limit: self.connections_limit,
            dispatch_timeout_seconds: self.dispatch_timeout,
            drain_timeout_seconds: self.drain_timeout,
            partition_strategy: self.partition_strategy,
            partitions,
            ..GatewayConfig::default()
        }
    }

    /// Queue settings derived from the flags.
    #[must_use]
    pub fn queue_defaults(&self) -> QueueSettings {
        QueueSettings {
            servers: self
                .queue_servers
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// The configured store endpoint, for logging.
    #[must_use]
    pub fn store_endpoint(&self) -> String {
        format!("{}:{}", self.consul_host, self.consul_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["shardgate"]).unwrap();
        assert_eq!(cli.port, 8822);
        assert_eq!(cli.connections_limit, 10_000);
        assert_eq!(cli.store_endpoint(), "127.0.0.1:8500");
        assert_eq!(cli.jwt_secret_env, "SHARDGATE_JWT_SECRET");

        let router = cli.router_defaults();
        assert_eq!(router, GatewayConfig::default());
        assert!(cli.queue_defaults().servers.is_empty());
    }

    #[test]
    fn queue_flags_replace_default_table() {
        let cli = Cli::try_parse_from([
            "shardgate",
            "--queue",
            "orders=4",
            "--queue",
            "catalog=0",
            "--partition-strategy",
            "fnv",
            "-n",
            "http://q1:9000, http://q2:9000",
        ])
        .unwrap();

        let router = cli.router_defaults();
        assert_eq!(router.partitions.partition_count("orders"), 4);
        assert!(router.partitions.contains("catalog"));
        assert!(!router.partitions.contains("air-bo"));
        assert_eq!(router.partition_strategy, PartitionStrategy::Fnv1a);
        assert_eq!(
            cli.queue_defaults().servers,
            vec!["http://q1:9000".to_string(), "http://q2:9000".to_string()]
        );
    }

    #[test]
    fn negative_limit_accepted() {
        let cli = Cli::try_parse_from(["shardgate", "--connections-limit", "-1"]).unwrap();
        assert_eq!(cli.router_defaults().connection_cap(), None);
    }

    #[test]
    fn bad_queue_entry_rejected() {
        assert!(Cli::try_parse_from(["shardgate", "--queue", "orders"]).is_err());
    }
}
