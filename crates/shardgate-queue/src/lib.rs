//! Queue dispatch for shardgate.
//!
//! The gateway talks to its backend queues through one seam,
//! [`QueueBackend`], and always through a [`Bridge`] that bounds the wait
//! for a reply. Two backends are provided:
//!
//! - [`LocalQueues`]: in-process partition workers fed by bounded channels
//! - [`HttpQueueBackend`]: a relay that posts requests to remote queue servers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shardgate_core::{QueueId, Route};
//! use shardgate_queue::{Bridge, EchoHandler, LocalQueues, Method, Request};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queues = LocalQueues::builder()
//!     .no_party("manifest", Arc::new(EchoHandler))
//!     .build();
//! let bridge = Bridge::with_timeout(Arc::new(queues), Duration::from_secs(5));
//!
//! let route = Route::NoParty {
//!     queue_id: QueueId::new("manifest", 0),
//!     resource: "list".to_string(),
//! };
//! let response = bridge.dispatch(Request::for_route(Method::Get, &route)).await?;
//! assert_eq!(response.status_code, 200);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod bridge;
pub mod error;
pub mod http;
pub mod local;
pub mod types;

pub use backend::QueueBackend;
pub use bridge::{Bridge, DEFAULT_TIMEOUT};
pub use error::{QueueError, Result};
pub use http::HttpQueueBackend;
pub use local::{EchoHandler, Handler, HandlerFactory, LocalQueues, LocalQueuesBuilder};
pub use types::{Method, QueryMap, Request, Response};
