//! Cluster Key Routing - hash slots and topology layout
//!
//! Implements the Redis Cluster keyspace model:
//! - CRC16 (XMODEM) checksum
//! - Hash slot algorithm (CRC16 mod 16384) with `{tag}` co-location
//! - Balanced master/replica topology generation

pub mod crc16;
pub mod hash_slot;
pub mod topology;
pub mod types;

pub use crc16::crc16;
pub use hash_slot::{
    HashSlot, analyze_hash_tag, calculate_slot, effective_key, extract_hash_tag, hash_slot,
};
pub use topology::{ClusterTopology, TopologyGenerator, generate_topology, recommended_topology};
pub use types::{
    ClusterError, ClusterNode, ClusterResult, HashSlotInfo, HashTagAnalysis, MIN_MASTERS,
    NodeRole, SlotRange, TOTAL_SLOTS,
};
