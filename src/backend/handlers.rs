use super::cluster::{MockCluster, MockError};
use crate::control_plane::protocol::*;
use crate::topology::types::{ComponentDto, ComponentStatus};

use axum::{
    Extension, Json,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PartitionKeyQuery {
    #[serde(default)]
    pub key: Option<String>,
}

fn error_response(err: MockError) -> Response {
    let status = match &err {
        MockError::NotFound(_) => StatusCode::NOT_FOUND,
        MockError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    tracing::debug!("Responding {}: {}", status.as_u16(), err);
    (
        status,
        Json(ErrorBody {
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}

pub async fn handle_get_status(
    Extension(cluster): Extension<Arc<MockCluster>>,
) -> (StatusCode, Json<Vec<ComponentDto>>) {
    (StatusCode::OK, Json(cluster.system_status()))
}

pub async fn handle_set_status(
    Extension(cluster): Extension<Arc<MockCluster>>,
    Json(req): Json<StatusToggleRequest>,
) -> (StatusCode, Json<StatusToggleResponse>) {
    tracing::info!("Toggle request: {} -> {}", req.name, req.status);
    let resp = cluster.set_status(&req.name, req.status).await;
    (StatusCode::OK, Json(resp))
}

pub async fn handle_partition_servers(
    Extension(cluster): Extension<Arc<MockCluster>>,
) -> (StatusCode, Json<Vec<PartitionServerView>>) {
    (StatusCode::OK, Json(cluster.partition_servers().await))
}

pub async fn handle_leader_log(
    Extension(cluster): Extension<Arc<MockCluster>>,
) -> (StatusCode, Json<Vec<String>>) {
    (StatusCode::OK, Json(cluster.leader_log().await))
}

pub async fn handle_list_files(
    Extension(cluster): Extension<Arc<MockCluster>>,
) -> (StatusCode, Json<Vec<FileEntry>>) {
    (StatusCode::OK, Json(cluster.files().await))
}

pub async fn handle_partition_for_key(
    Extension(cluster): Extension<Arc<MockCluster>>,
    Query(query): Query<PartitionKeyQuery>,
) -> Response {
    let Some(key) = query.key.filter(|k| !k.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: Some("Missing key".to_string()),
            }),
        )
            .into_response();
    };

    match cluster.partition_for_key(&key) {
        Ok(owner) => (
            StatusCode::OK,
            Json(PartitionAssignment {
                partition_server: owner.to_string(),
                key: Some(key),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_file_metadata(
    Extension(cluster): Extension<Arc<MockCluster>>,
    Path(filename): Path<String>,
) -> Response {
    match cluster.metadata(&filename).await {
        Ok(metadata) => (StatusCode::OK, Json(metadata)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_stream_get_file(
    Extension(cluster): Extension<Arc<MockCluster>>,
    Json(req): Json<StreamGetFileRequest>,
) -> Response {
    match cluster.locate(&req.filename).await {
        Ok(node) => (
            StatusCode::OK,
            Json(StreamLocation {
                extent_node_id: node.to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_extent_retrieve(
    Extension(cluster): Extension<Arc<MockCluster>>,
    Path(id): Path<String>,
) -> Response {
    match cluster.retrieve(&id) {
        Ok(chunk) => (StatusCode::OK, Json(chunk)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn handle_health() -> (StatusCode, Json<ComponentStatus>) {
    (StatusCode::OK, Json(ComponentStatus::Up))
}
