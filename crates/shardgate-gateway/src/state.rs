//! Gateway application state.
//!
//! Everything here is built once at startup and shared read-only by all
//! request handlers.

use std::sync::Arc;

use shardgate_auth::AccountService;
use shardgate_core::Resolver;
use shardgate_queue::{Bridge, QueueBackend};
use shardgate_store::AccountStore;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<B, S>
where
    B: QueueBackend + ?Sized,
    S: AccountStore + ?Sized,
{
    /// Route resolver over the immutable partition table.
    pub resolver: Resolver,
    /// Bounded dispatch to the queue backend.
    pub bridge: Bridge<B>,
    /// Registration, login and token verification.
    pub accounts: AccountService<S>,
    /// Router settings.
    pub config: GatewayConfig,
}

impl<B, S> GatewayState<B, S>
where
    B: QueueBackend + ?Sized,
    S: AccountStore + ?Sized,
{
    /// Create a new gateway state.
    ///
    /// The resolver and the bridge timeout are derived from `config`.
    #[must_use]
    pub fn new(backend: Arc<B>, accounts: AccountService<S>, config: GatewayConfig) -> Self {
        let resolver = Resolver::new(
            Arc::new(config.partitions.clone()),
            config.partition_strategy,
        );
        let bridge = Bridge::with_timeout(backend, config.dispatch_timeout());
        Self {
            resolver,
            bridge,
            accounts,
            config,
        }
    }
}

impl<B, S> Clone for GatewayState<B, S>
where
    B: QueueBackend + ?Sized,
    S: AccountStore + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            bridge: self.bridge.clone(),
            accounts: self.accounts.clone(),
            config: self.config.clone(),
        }
    }
}
