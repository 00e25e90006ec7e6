//! Partition table and partition calculator.
//!
//! The [`PartitionTable`] is built once at startup and shared read-only by
//! every request handler. A partition count of `0` marks a no-party queue;
//! any positive count is the number of shards behind the alias.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::QueueId;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// How a dividend is turned into a partition index.
///
/// A deployment runs exactly one strategy; the two place the same logical key
/// on different shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// `dividend mod partitions`.
    #[default]
    Modulo,
    /// `fnv1a32(resource_name + dividend) mod partitions`.
    Fnv1a,
}

impl PartitionStrategy {
    /// Compute the partition index for a dividend on a queue with
    /// `partitions` shards.
    ///
    /// `resource_name` only participates in the FNV-1a key.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ZeroDividend` if `dividend` is `0`; zero is reserved
    /// for no-party requests.
    pub fn partition(self, dividend: u64, partitions: u32, resource_name: &str) -> Result<u32> {
        if dividend == 0 {
            return Err(CoreError::ZeroDividend);
        }
        if partitions == 0 {
            return Ok(0);
        }

        let index = match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Modulo => (dividend % u64::from(partitions)) as u32, // < partitions
            Self::Fnv1a => {
                let key = format!("{resource_name}{dividend}");
                fnv1a32(key.as_bytes()) % partitions
            }
        };

        Ok(index)
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modulo => f.write_str("modulo"),
            Self::Fnv1a => f.write_str("fnv"),
        }
    }
}

impl FromStr for PartitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "modulo" | "mod" => Ok(Self::Modulo),
            "fnv" | "fnv1a" | "hash" => Ok(Self::Fnv1a),
            other => Err(format!("unknown partition strategy: {other}")),
        }
    }
}

/// One `alias=count` line of the partition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    /// Queue alias exposed at the HTTP boundary.
    pub alias: String,
    /// Partition count; `0` for no-party queues.
    pub partitions: u32,
}

impl FromStr for PartitionEntry {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (alias, count) = s
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidEntry(s.to_string()))?;
        let alias = alias.trim();
        if alias.is_empty() || alias.contains(['/', ':']) {
            return Err(CoreError::InvalidEntry(s.to_string()));
        }
        let partitions = count
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidEntry(s.to_string()))?;
        Ok(Self {
            alias: alias.to_string(),
            partitions,
        })
    }
}

/// Immutable alias → partition count mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionTable {
    queues: BTreeMap<String, u32>,
}

impl PartitionTable {
    /// Start building a table.
    #[must_use]
    pub fn builder() -> PartitionTableBuilder {
        PartitionTableBuilder::default()
    }

    /// Partition count for `alias`. Unknown aliases count as no-party (`0`).
    #[must_use]
    pub fn partition_count(&self, alias: &str) -> u32 {
        self.queues.get(alias).copied().unwrap_or(0)
    }

    /// Returns `true` if `alias` is registered.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.queues.contains_key(alias)
    }

    /// The queue id for `alias` as the backend knows it.
    #[must_use]
    pub fn queue_id(&self, alias: &str) -> QueueId {
        QueueId::new(alias, self.partition_count(alias))
    }

    /// Registered aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.queues.keys().map(String::as_str)
    }

    /// Registered queues with their partition counts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.queues.iter().map(|(alias, count)| (alias.as_str(), *count))
    }

    /// Number of registered aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// Returns `true` if no alias is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

impl FromIterator<PartitionEntry> for PartitionTable {
    fn from_iter<I: IntoIterator<Item = PartitionEntry>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::builder(), |builder, entry| {
                builder.queue(entry.alias, entry.partitions)
            })
            .build()
    }
}

/// Builder for [`PartitionTable`]. The table is frozen by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct PartitionTableBuilder {
    queues: BTreeMap<String, u32>,
}

impl PartitionTableBuilder {
    /// Register `alias` with `partitions` shards. Later registrations win.
    #[must_use]
    pub fn queue(mut self, alias: impl Into<String>, partitions: u32) -> Self {
        self.queues.insert(alias.into(), partitions);
        self
    }

    /// Freeze the table.
    #[must_use]
    pub fn build(self) -> PartitionTable {
        PartitionTable {
            queues: self.queues,
        }
    }
}
