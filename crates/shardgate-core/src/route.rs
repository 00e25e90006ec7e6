//! Route resolution.
//!
//! Turns the variables captured from a request path into a dispatch decision.
//! The alias's partition count selects the path: `0` (or an unknown alias)
//! routes to the no-party queue, any positive count to a partitioned one.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::ids::QueueId;
use crate::partition::{PartitionStrategy, PartitionTable};

/// Variables captured from a request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteVars {
    /// Queue alias (first path segment).
    pub alias: String,
    /// Raw partition dividend, if the route carries one.
    pub dividend: Option<String>,
    /// Resource name, e.g. `orders`.
    pub resource_name: Option<String>,
    /// Resource id, e.g. `17`.
    pub resource_id: Option<String>,
}

impl RouteVars {
    /// `/{alias}/{dividend}`.
    #[must_use]
    pub fn help(alias: impl Into<String>, dividend: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            dividend: Some(dividend.into()),
            ..Self::default()
        }
    }

    /// `/{alias}/{dividend}/{resource}`.
    #[must_use]
    pub fn partitioned(
        alias: impl Into<String>,
        dividend: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            dividend: Some(dividend.into()),
            resource_name: Some(resource_name.into()),
            resource_id: None,
        }
    }

    /// `/{alias}/{resource}`.
    #[must_use]
    pub fn no_party(alias: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            resource_name: Some(resource_name.into()),
            ..Self::default()
        }
    }

    /// Attach a resource id.
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// `dividend[/resource_name[/resource_id]]`, skipping absent segments.
    #[must_use]
    pub fn resource_path(&self) -> String {
        [&self.dividend, &self.resource_name, &self.resource_id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// The dispatch decision for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Single-shard queue; dividend and partition number are both `0`.
    NoParty {
        /// Target queue (`alias:0`).
        queue_id: QueueId,
        /// Path suffix after the alias.
        resource: String,
    },
    /// Sharded queue.
    Partitioned {
        /// Target queue (`alias:N`).
        queue_id: QueueId,
        /// Caller-supplied dividend, never `0`.
        dividend: u64,
        /// Shard index in `[0, N)`.
        partition: u32,
        /// `dividend[/resource_name[/resource_id]]`.
        resource: String,
    },
}

impl Route {
    /// The target queue.
    #[must_use]
    pub const fn queue_id(&self) -> &QueueId {
        match self {
            Self::NoParty { queue_id, .. } | Self::Partitioned { queue_id, .. } => queue_id,
        }
    }

    /// The resource path handed to the backend.
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::NoParty { resource, .. } | Self::Partitioned { resource, .. } => resource,
        }
    }

    /// Dividend, `0` for no-party routes.
    #[must_use]
    pub const fn dividend(&self) -> u64 {
        match self {
            Self::NoParty { .. } => 0,
            Self::Partitioned { dividend, .. } => *dividend,
        }
    }

    /// Partition number, `0` for no-party routes.
    #[must_use]
    pub const fn partition(&self) -> u32 {
        match self {
            Self::NoParty { .. } => 0,
            Self::Partitioned { partition, .. } => *partition,
        }
    }
}

/// Resolves path variables against an immutable partition table.
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<PartitionTable>,
    strategy: PartitionStrategy,
}

impl Resolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(table: Arc<PartitionTable>, strategy: PartitionStrategy) -> Self {
        Self { table, strategy }
    }

    /// The partition table in use.
    #[must_use]
    pub fn table(&self) -> &PartitionTable {
        &self.table
    }

    /// Decide between no-party and partitioned dispatch.
    ///
    /// # Errors
    ///
    /// For partitioned aliases, returns `CoreError::InvalidDividend` if the
    /// dividend is missing or not a decimal number, and
    /// `CoreError::ZeroDividend` if it is `0`.
    pub fn resolve(&self, vars: &RouteVars) -> Result<Route> {
        let partitions = self.table.partition_count(&vars.alias);
        let queue_id = QueueId::new(vars.alias.clone(), partitions);
        let resource = vars.resource_path();

        if partitions == 0 {
            return Ok(Route::NoParty { queue_id, resource });
        }

        let dividend = parse_dividend(vars.dividend.as_deref().unwrap_or_default())?;
        let partition = self.strategy.partition(
            dividend,
            partitions,
            vars.resource_name.as_deref().unwrap_or_default(),
        )?;

        tracing::trace!(
            queue_id = %queue_id,
            dividend,
            partition,
            "Resolved partitioned route"
        );

        Ok(Route::Partitioned {
            queue_id,
            dividend,
            partition,
            resource,
        })
    }
}

/// Parse a decimal dividend. Signs and whitespace are rejected.
fn parse_dividend(raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidDividend(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| CoreError::InvalidDividend(raw.to_string()))
}
