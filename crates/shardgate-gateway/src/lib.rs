//! HTTP gateway routing authenticated requests onto partitioned queues.
//!
//! - Bearer-token gate over every route except registration and login
//! - Route resolution against an immutable partition table
//! - Bounded dispatch to a queue backend, reply written back verbatim
//! - Listener lifecycle with a connection cap and graceful drain
//!
//! # Request flow
//!
//! ```text
//!  client ──▶ CORS ──▶ trace ──▶ timeout ──▶ body limit ──▶ token gate
//!                                                              │
//!         ┌────────────────────────────────────────────────────┘
//!         ▼
//!  resolve route ──▶ normalize ──▶ bridge ──▶ QueueBackend
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shardgate_auth::{AccountService, AuthConfig};
//! use shardgate_gateway::{create_router, GatewayConfig, GatewayService, GatewayState, ServeOptions};
//! use shardgate_queue::{EchoHandler, LocalQueues};
//! use shardgate_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthConfig::new("secret")?;
//! let accounts = AccountService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(auth.issuer()),
//!     auth.subject_policy,
//! );
//! let backend = Arc::new(
//!     LocalQueues::builder()
//!         .no_party("manifest", Arc::new(EchoHandler))
//!         .build(),
//! );
//!
//! let config = GatewayConfig::default();
//! let options = ServeOptions::from(&config);
//! let app = create_router(GatewayState::new(backend, accounts, config));
//!
//! let service = GatewayService::bind("0.0.0.0:8822".parse()?, app, options).await?;
//! service.run(shardgate_gateway::shutdown::shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod cors;
pub mod deadline;
pub mod error;
pub mod handlers;
pub mod normalize;
pub mod routes;
pub mod service;
pub mod shutdown;
pub mod state;

pub use auth::AuthUser;
pub use config::{GatewayConfig, QueueSettings};
pub use error::ApiError;
pub use routes::create_router;
pub use service::{DrainOutcome, GatewayService, ServeOptions, ServiceError, ServicePhase};
pub use state::GatewayState;
