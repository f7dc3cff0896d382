pub mod cluster;
pub mod config;
pub mod logging;
pub mod server;

// Re-export commonly used types
pub use cluster::{
    ClusterError, ClusterNode, ClusterResult, ClusterTopology, HashSlot, HashSlotInfo,
    HashTagAnalysis, NodeRole, TopologyGenerator, analyze_hash_tag, calculate_slot,
    generate_topology, hash_slot, recommended_topology,
};
pub use config::ServerConfig;
pub use server::{AppState, create_router};
