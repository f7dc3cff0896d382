//! Cluster Topology Generation
//!
//! Partitions the 16384 hash slots across a number of masters as evenly
//! as possible and pairs every master with one replica.

use super::hash_slot::calculate_slot;
use super::types::{
    ClusterError, ClusterNode, ClusterResult, HashSlotInfo, MIN_MASTERS, NodeRole, SlotRange,
    TOTAL_SLOTS,
};
use crate::config::ClusterSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Generated cluster layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopology {
    pub master_count: usize,
    pub replica_count: usize,
    pub total_nodes: usize,
    pub total_slots: u16,
    /// Masters interleaved with their replicas: master-0, replica-0, master-1, ...
    pub nodes: Vec<ClusterNode>,
}

impl ClusterTopology {
    /// Master nodes in slot order
    pub fn masters(&self) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().filter(|n| n.is_master())
    }

    /// Replica nodes in master order
    pub fn replicas(&self) -> impl Iterator<Item = &ClusterNode> {
        self.nodes.iter().filter(|n| !n.is_master())
    }

    /// Get node information
    pub fn get_node(&self, node_id: &str) -> Option<&ClusterNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Replica paired with the given master
    pub fn replica_of(&self, master_id: &str) -> Option<&ClusterNode> {
        self.replicas().find(|n| n.paired_with == master_id)
    }

    /// Slot ranges of all masters, ascending
    pub fn slot_ranges(&self) -> Vec<SlotRange> {
        self.masters().filter_map(ClusterNode::slot_range).collect()
    }

    /// Master whose range contains `slot`
    pub fn owner_of_slot(&self, slot: u16) -> ClusterResult<&ClusterNode> {
        if slot >= TOTAL_SLOTS {
            return Err(ClusterError::InvalidSlot(slot));
        }
        // Ranges are sorted and contiguous, so a binary search on the end works.
        let masters: Vec<&ClusterNode> = self.masters().collect();
        let idx = masters.partition_point(|m| m.slot_range_end.is_some_and(|end| end < slot));
        masters
            .get(idx)
            .copied()
            .filter(|m| m.slot_range().is_some_and(|r| r.contains(slot)))
            .ok_or_else(|| {
                ClusterError::InvalidConfiguration(format!("slot {} is not covered", slot))
            })
    }

    /// Master that serves `key`, with the key's slot information
    pub fn route_key(&self, key: &str) -> ClusterResult<(HashSlotInfo, &ClusterNode)> {
        let info = calculate_slot(key);
        let owner = self.owner_of_slot(info.slot)?;
        Ok((info, owner))
    }

    /// Re-check the layout invariants: contiguous full coverage starting at
    /// slot 0 and exactly one replica per master, linked both ways.
    pub fn validate(&self) -> ClusterResult<()> {
        let invalid = |msg: String| Err(ClusterError::InvalidConfiguration(msg));

        if self.master_count < MIN_MASTERS {
            return invalid(format!(
                "{} masters, at least {} required",
                self.master_count, MIN_MASTERS
            ));
        }
        if self.nodes.len() != self.master_count * 2 || self.total_nodes != self.nodes.len() {
            return invalid(format!(
                "expected {} nodes, found {}",
                self.master_count * 2,
                self.nodes.len()
            ));
        }

        let by_id: HashMap<&str, &ClusterNode> =
            self.nodes.iter().map(|n| (n.node_id.as_str(), n)).collect();

        let mut next_slot: u32 = 0;
        for master in self.masters() {
            let Some(range) = master.slot_range() else {
                return invalid(format!("master {} has no slot range", master.node_id));
            };
            if u32::from(range.start) != next_slot || range.start > range.end {
                return invalid(format!(
                    "master {} starts at slot {}, expected {}",
                    master.node_id, range.start, next_slot
                ));
            }
            next_slot = u32::from(range.end) + 1;

            let paired = by_id
                .get(master.paired_with.as_str())
                .filter(|r| r.role == NodeRole::Replica && r.paired_with == master.node_id);
            if paired.is_none() {
                return invalid(format!("master {} has no paired replica", master.node_id));
            }
        }
        if next_slot != u32::from(TOTAL_SLOTS) {
            return invalid(format!("slots {}..{} are not covered", next_slot, TOTAL_SLOTS));
        }

        for replica in self.replicas() {
            if replica.slot_range_start.is_some() || replica.slot_range_end.is_some() {
                return invalid(format!("replica {} owns slots", replica.node_id));
            }
        }

        Ok(())
    }
}

/// Builds balanced master/replica layouts
#[derive(Debug, Clone)]
pub struct TopologyGenerator {
    host: String,
    base_port: u16,
}

impl Default for TopologyGenerator {
    fn default() -> Self {
        Self::from_settings(&ClusterSettings::default())
    }
}

impl TopologyGenerator {
    /// Create a generator that hands out ports from `base_port` upwards
    pub fn new(host: impl Into<String>, base_port: u16) -> Self {
        Self {
            host: host.into(),
            base_port,
        }
    }

    pub fn from_settings(settings: &ClusterSettings) -> Self {
        Self::new(settings.node_host.clone(), settings.base_port)
    }

    /// Recommended layout: 3 masters, 3 replicas
    pub fn recommended(&self) -> ClusterResult<ClusterTopology> {
        self.generate(MIN_MASTERS)
    }

    /// Generate a topology with `master_count` masters, each backed by one
    /// replica. The first `16384 % master_count` masters own one extra slot.
    pub fn generate(&self, master_count: usize) -> ClusterResult<ClusterTopology> {
        let total_slots = usize::from(TOTAL_SLOTS);

        if master_count < MIN_MASTERS {
            return Err(ClusterError::InvalidConfiguration(format!(
                "master count must be at least {}, got {}",
                MIN_MASTERS, master_count
            )));
        }
        if master_count > total_slots {
            return Err(ClusterError::InvalidConfiguration(format!(
                "master count must be at most {}, got {}",
                total_slots, master_count
            )));
        }
        let last_port = usize::from(self.base_port) + master_count * 2 - 1;
        if last_port > usize::from(u16::MAX) {
            return Err(ClusterError::InvalidConfiguration(format!(
                "{} nodes do not fit in ports {}..={}",
                master_count * 2,
                self.base_port,
                u16::MAX
            )));
        }

        let base = total_slots / master_count;
        let remainder = total_slots % master_count;

        let mut nodes = Vec::with_capacity(master_count * 2);
        let mut start = 0usize;

        for i in 0..master_count {
            let size = base + usize::from(i < remainder);
            let end = start + size - 1;

            let master_id = format!("master-{}", i);
            let replica_id = format!("{}-replica", master_id);

            debug!(
                "Assigning slots {}-{} ({} slots) to {}",
                start, end, size, master_id
            );

            nodes.push(ClusterNode {
                node_id: master_id.clone(),
                address: self.address(i),
                role: NodeRole::Master,
                slot_range_start: Some(start as u16),
                slot_range_end: Some(end as u16),
                paired_with: replica_id.clone(),
            });
            nodes.push(ClusterNode {
                node_id: replica_id,
                address: self.address(master_count + i),
                role: NodeRole::Replica,
                slot_range_start: None,
                slot_range_end: None,
                paired_with: master_id,
            });

            start = end + 1;
        }

        info!(
            "Generated topology with {} masters and {} replicas",
            master_count, master_count
        );

        Ok(ClusterTopology {
            master_count,
            replica_count: master_count,
            total_nodes: nodes.len(),
            total_slots: TOTAL_SLOTS,
            nodes,
        })
    }

    fn address(&self, offset: usize) -> String {
        format!("{}:{}", self.host, usize::from(self.base_port) + offset)
    }
}

/// Generate a topology using the default node addresses
pub fn generate_topology(master_count: usize) -> ClusterResult<ClusterTopology> {
    TopologyGenerator::default().generate(master_count)
}

/// Recommended 3-master topology using the default node addresses
pub fn recommended_topology() -> ClusterResult<ClusterTopology> {
    TopologyGenerator::default().recommended()
}
