use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total number of hash slots (Redis-compatible)
pub const TOTAL_SLOTS: u16 = 16384;

/// Minimum number of masters a cluster needs to reach failover quorum
pub const MIN_MASTERS: usize = 3;

/// Role of a node in a generated topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Owns a slot range
    Master,
    /// Replicates exactly one master
    Replica,
}

/// Slot range (inclusive start, inclusive end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
}

impl SlotRange {
    pub fn new(start: u16, end: u16) -> ClusterResult<Self> {
        if start > end || end >= TOTAL_SLOTS {
            return Err(ClusterError::InvalidConfiguration(format!(
                "invalid slot range {}-{}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }

    /// Number of slots in the range. Returned as `u32` because a single
    /// range may span all 16384 slots.
    pub fn count(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }
}

/// Slot information for a single key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashSlotInfo {
    /// The key as supplied by the caller
    pub key: String,
    /// Hash slot (0-16383)
    pub slot: u16,
    /// Non-empty `{...}` tag found in the key, if any
    pub hash_tag: Option<String>,
}

/// Co-location analysis for a group of keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashTagAnalysis {
    /// Keys in the order they were supplied
    pub keys: Vec<String>,
    /// Common hash tag (only when co-located)
    pub hash_tag: Option<String>,
    /// True when every key carries the same explicit, non-empty tag
    pub co_located: bool,
    /// Common slot (only when co-located)
    pub slot: Option<u16>,
}

/// A node in a generated topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNode {
    pub node_id: String,
    /// Node address (host:port)
    pub address: String,
    pub role: NodeRole,
    /// First owned slot (masters only)
    pub slot_range_start: Option<u16>,
    /// Last owned slot, inclusive (masters only)
    pub slot_range_end: Option<u16>,
    /// Replica id for a master, master id for a replica
    pub paired_with: String,
}

impl ClusterNode {
    pub fn is_master(&self) -> bool {
        self.role == NodeRole::Master
    }

    /// Slot range owned by this node. Replicas own none.
    pub fn slot_range(&self) -> Option<SlotRange> {
        match (self.slot_range_start, self.slot_range_end) {
            (Some(start), Some(end)) => Some(SlotRange { start, end }),
            _ => None,
        }
    }
}

/// Cluster error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("Empty input: {0}")]
    EmptyInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid slot: {0} (must be < 16384)")]
    InvalidSlot(u16),
}

/// Cluster result type
pub type ClusterResult<T> = Result<T, ClusterError>;
