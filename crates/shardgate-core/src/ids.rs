//! Queue identifiers.
//!
//! A queue is addressed on the backend as `alias:partitions`, e.g. `air-bo:10`
//! for a queue split into ten shards or `air-bo-view:0` for a no-party queue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Backend queue identifier: the HTTP-facing alias plus its partition count.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueId {
    alias: String,
    partitions: u32,
}

impl QueueId {
    /// Create a queue id from its parts.
    #[must_use]
    pub fn new(alias: impl Into<String>, partitions: u32) -> Self {
        Self {
            alias: alias.into(),
            partitions,
        }
    }

    /// The queue alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Number of partitions; `0` marks a no-party queue.
    #[must_use]
    pub const fn partitions(&self) -> u32 {
        self.partitions
    }

    /// Returns `true` if the queue is split into shards.
    #[must_use]
    pub const fn is_partitioned(&self) -> bool {
        self.partitions > 0
    }
}

impl fmt::Debug for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueueId({self})")
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alias, self.partitions)
    }
}

impl FromStr for QueueId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Aliases may not contain ':', so the last separator is the only one.
        let (alias, partitions) = s
            .rsplit_once(':')
            .ok_or_else(|| CoreError::InvalidQueueId(s.to_string()))?;
        if alias.is_empty() || alias.contains(':') {
            return Err(CoreError::InvalidQueueId(s.to_string()));
        }
        let partitions = partitions
            .parse()
            .map_err(|_| CoreError::InvalidQueueId(s.to_string()))?;
        Ok(Self::new(alias, partitions))
    }
}

impl TryFrom<String> for QueueId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QueueId> for String {
    fn from(id: QueueId) -> Self {
        id.to_string()
    }
}
