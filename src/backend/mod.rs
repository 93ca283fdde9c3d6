//! Mock Control Plane Module
//!
//! A self-contained stand-in for the object-storage cluster's control plane and data path,
//! served over the same HTTP routes the simulator's client speaks. It lets the simulator run
//! against something real without deploying the services it animates.
//!
//! ## Core Concepts
//! - **Components**: Front-End Service, Partition Manager, Stream Manager, two Partition Servers
//!   and four Extent Nodes, all starting up. Status lives in a `DashMap`.
//! - **Files**: A few seeded objects, each with an ordered replica list. The first replica is
//!   the file's current location.
//! - **Migration**: Taking an up extent node down moves each file located there to a random
//!   other up extent node and records the move.
//! - **Leader election**: Taking the Partition Manager down starts a stepped election. Every
//!   leader-log read advances it; on the last step the manager is back up and the log carries
//!   the completion line.
//! - **Partitioning**: Keys are assigned to partition servers by hash.

pub mod cluster;
pub mod handlers;


use crate::control_plane::protocol::*;
use cluster::MockCluster;
use handlers::*;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn router(cluster: Arc<MockCluster>) -> Router {
    Router::new()
        .route(
            ENDPOINT_SYSTEM_STATUS,
            get(handle_get_status).post(handle_set_status),
        )
        .route(ENDPOINT_PARTITION_SERVERS, get(handle_partition_servers))
        .route(ENDPOINT_LEADER_ELECTION_LOG, get(handle_leader_log))
        .route("/files", get(handle_list_files))
        .route(ENDPOINT_PARTITION_FOR_KEY, get(handle_partition_for_key))
        .route(
            &format!("{}/:filename", ENDPOINT_FILE_METADATA),
            get(handle_file_metadata),
        )
        .route(ENDPOINT_STREAM_GET_FILE, post(handle_stream_get_file))
        .route(
            &format!("{}/:id", ENDPOINT_EXTENT_RETRIEVE),
            get(handle_extent_retrieve),
        )
        .route("/health", get(handle_health))
        .layer(Extension(cluster))
}

/// Serves `cluster` on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, cluster: Arc<MockCluster>) -> anyhow::Result<()> {
    tracing::info!("Mock control plane listening on {}", listener.local_addr()?);
    axum::serve(listener, router(cluster)).await?;
    Ok(())
}

/// Binds `addr` and serves `cluster` on it.
pub async fn bind_and_serve(addr: SocketAddr, cluster: Arc<MockCluster>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, cluster).await
}
