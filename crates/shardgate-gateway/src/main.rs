//! Shardgate - partitioned queue gateway.
//!
//! This is the main entry point for the gateway service.
//!
//! # Queue backends
//!
//! With `--queue-servers` set, requests are relayed over HTTP to the listed
//! servers. Without it every configured alias gets in-process echo workers.
//!
//! # Signing key
//!
//! The token signing secret is read from the environment variable named by
//! `--jwt-secret-env` (`SHARDGATE_JWT_SECRET` by default). Startup fails if
//! it is unset or empty.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardgate_auth::{AccountService, AuthConfig};
use shardgate_core::PartitionTable;
use shardgate_gateway::cli::Cli;
use shardgate_gateway::config::{QUEUE_SETTINGS_PREFIX, ROUTER_SETTINGS_PREFIX};
use shardgate_gateway::shutdown::shutdown_signal;
use shardgate_gateway::{
    create_router, GatewayConfig, GatewayService, GatewayState, QueueSettings, ServeOptions,
};
use shardgate_queue::{
    EchoHandler, Handler, HttpQueueBackend, LocalQueues, QueueBackend,
};
use shardgate_store::{load_or_put, MemoryStore, RocksStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shardgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shardgate");

    let store: Arc<dyn Store> = if cli.ephemeral {
        tracing::warn!("Ephemeral mode - accounts and settings are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(
            path = %cli.data_dir.display(),
            endpoint = %cli.store_endpoint(),
            "Opening configuration store"
        );
        Arc::new(RocksStore::open(&cli.data_dir)?)
    };

    let config: GatewayConfig =
        load_or_put(store.as_ref(), ROUTER_SETTINGS_PREFIX, || cli.router_defaults())?;
    let queues: QueueSettings =
        load_or_put(store.as_ref(), QUEUE_SETTINGS_PREFIX, || cli.queue_defaults())?;

    tracing::info!(
        port = config.port,
        read_timeout = config.read_timeout_seconds,
        write_timeout = config.write_timeout_seconds,
        connections_limit = config.connections_limit,
        strategy = %config.partition_strategy,
        queues = config.partitions.len(),
        "Gateway configuration loaded"
    );

    let auth = AuthConfig::from_env(&cli.jwt_secret_env)?.with_subject_policy(cli.subject_policy);
    let accounts = AccountService::new(Arc::clone(&store), Arc::new(auth.issuer()), auth.subject_policy);
    tracing::info!(subject_policy = %accounts.policy(), "Token issuer initialized");

    let backend = build_backend(&queues, &config.partitions)?;

    let options = ServeOptions::from(&config);
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let app = create_router(GatewayState::new(backend, accounts, config));

    let service = GatewayService::bind(addr, app, options).await?;
    service.run(shutdown_signal()).await?;

    Ok(())
}

fn build_backend(
    queues: &QueueSettings,
    partitions: &PartitionTable,
) -> Result<Arc<dyn QueueBackend>, Box<dyn std::error::Error>> {
    if !queues.servers.is_empty() {
        tracing::info!(servers = ?queues.servers, "Relaying to queue servers");
        return Ok(Arc::new(HttpQueueBackend::new(queues.servers.clone())?));
    }

    tracing::warn!("No queue servers configured - serving in-process echo queues");
    let mut builder = LocalQueues::builder();
    for (alias, count) in partitions.iter() {
        builder = if count == 0 {
            builder.no_party(alias, Arc::new(EchoHandler))
        } else {
            builder.partitioned(
                partitions.queue_id(alias),
                Box::new(|_| Arc::new(EchoHandler) as Arc<dyn Handler>),
            )
        };
    }
    Ok(Arc::new(builder.build()))
}
