use crate::cluster::{
    ClusterError, ClusterNode, ClusterResult, ClusterTopology, HashSlotInfo, HashTagAnalysis,
    MIN_MASTERS, TopologyGenerator, analyze_hash_tag, calculate_slot,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub topology_generator: Arc<TopologyGenerator>,
}

impl AppState {
    pub fn new(topology_generator: TopologyGenerator) -> Self {
        Self {
            topology_generator: Arc::new(topology_generator),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TopologyGenerator::default())
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// Number of masters in the topology to route against
    pub masters: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    #[serde(flatten)]
    pub slot_info: HashSlotInfo,
    pub master: ClusterNode,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "keyslot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /slot/{key}
pub async fn slot_for_key(Path(key): Path<String>) -> Json<HashSlotInfo> {
    let info = calculate_slot(&key);
    debug!("Key {} maps to slot {}", info.key, info.slot);
    Json(info)
}

/// POST /hash-tag/analyze
pub async fn hash_tag_analyze(
    Json(keys): Json<Vec<String>>,
) -> ClusterResult<Json<HashTagAnalysis>> {
    let analysis = analyze_hash_tag(&keys).inspect_err(log_rejection)?;
    debug!(
        "Analyzed {} keys: co_located={}",
        analysis.keys.len(),
        analysis.co_located
    );
    Ok(Json(analysis))
}

/// GET /topology
pub async fn recommended_topology(
    State(state): State<AppState>,
) -> ClusterResult<Json<ClusterTopology>> {
    let topology = state.topology_generator.recommended()?;
    Ok(Json(topology))
}

/// GET /topology/{master_count}
pub async fn topology_for_masters(
    State(state): State<AppState>,
    Path(master_count): Path<usize>,
) -> ClusterResult<Json<ClusterTopology>> {
    let topology = state
        .topology_generator
        .generate(master_count)
        .inspect_err(log_rejection)?;
    Ok(Json(topology))
}

/// GET /route/{key}?masters=N
pub async fn route_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RouteQuery>,
) -> ClusterResult<Json<RouteResponse>> {
    let master_count = query.masters.unwrap_or(MIN_MASTERS);
    let topology = state
        .topology_generator
        .generate(master_count)
        .inspect_err(log_rejection)?;
    let (slot_info, master) = topology.route_key(&key)?;
    Ok(Json(RouteResponse {
        master: master.clone(),
        slot_info,
    }))
}

fn log_rejection(err: &ClusterError) {
    warn!("Rejected request: {}", err);
}
