//! Core routing types for shardgate.
//!
//! This crate provides the pure, allocation-light pieces of the gateway that
//! every other crate builds on:
//!
//! - **Identifiers**: [`QueueId`], the `alias:partitions` name of a backend queue
//! - **Partition table**: the immutable alias → partition count mapping
//! - **Partition calculator**: modulo (canonical) and FNV-1a strategies
//! - **Route resolution**: path variables → no-party or partitioned dispatch
//!
//! # Example
//!
//! ```
//! use shardgate_core::{PartitionStrategy, PartitionTable, Resolver, Route, RouteVars};
//!
//! let table = PartitionTable::builder()
//!     .queue("air-bo", 10)
//!     .queue("air-bo-view", 0)
//!     .build();
//! let resolver = Resolver::new(table.into(), PartitionStrategy::Modulo);
//!
//! let route = resolver
//!     .resolve(&RouteVars::partitioned("air-bo", "42", "orders"))
//!     .unwrap();
//! match route {
//!     Route::Partitioned { partition, .. } => assert_eq!(partition, 2),
//!     Route::NoParty { .. } => unreachable!(),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod partition;
pub mod route;

pub use error::{CoreError, Result};
pub use ids::QueueId;
pub use partition::{fnv1a32, PartitionEntry, PartitionStrategy, PartitionTable};
pub use route::{Resolver, Route, RouteVars};
