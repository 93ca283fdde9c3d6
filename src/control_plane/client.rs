use super::error::{ControlPlaneError, Stage};
use super::protocol::*;
use crate::topology::types::{Component, ComponentDto, ComponentRole, ComponentStatus, Snapshot};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// The storage control plane as seen by the simulator.
///
/// Every call is a single request/response. Retry policy, where there is
/// one, belongs to the caller.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn get_system_status(&self) -> Result<Snapshot, ControlPlaneError>;

    async fn set_component_status(
        &self,
        name: &str,
        status: ComponentStatus,
    ) -> Result<StatusToggleResponse, ControlPlaneError>;

    async fn get_partition_servers(&self) -> Result<Vec<PartitionServerView>, ControlPlaneError>;

    async fn get_leader_election_log(&self) -> Result<Vec<String>, ControlPlaneError>;

    async fn resolve_partition_for_key(
        &self,
        filename: &str,
    ) -> Result<PartitionAssignment, ControlPlaneError>;

    async fn get_file_metadata(&self, filename: &str) -> Result<FileMetadata, ControlPlaneError>;

    async fn fetch_from_stream_manager(
        &self,
        filename: &str,
    ) -> Result<StreamLocation, ControlPlaneError>;

    async fn retrieve_from_extent_node(
        &self,
        extent_node_id: &str,
    ) -> Result<FileChunk, ControlPlaneError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// `ControlPlane` over HTTP/JSON.
pub struct HttpControlPlane {
    http_client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpControlPlane {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: normalize_base_url(&config.base_url),
            request_timeout: config.request_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        stage: &Stage,
    ) -> Result<reqwest::Response, ControlPlaneError> {
        request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ControlPlaneError::new(stage.clone(), e.to_string()))
    }

    /// Decodes a 2xx body, or turns anything else into a stage error whose
    /// message comes from the body's `error` field when present.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        stage: Stage,
        fallback: &str,
    ) -> Result<T, ControlPlaneError> {
        if !response.status().is_success() {
            let message = error_message(response, fallback).await;
            return Err(ControlPlaneError::new(stage, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ControlPlaneError::new(stage, format!("invalid response: {}", e)))
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn get_system_status(&self) -> Result<Snapshot, ControlPlaneError> {
        let response = self
            .send(self.http_client.get(self.url(ENDPOINT_SYSTEM_STATUS)), &Stage::System)
            .await?;
        let raw: Vec<ComponentDto> =
            Self::decode(response, Stage::System, "Status fetch failed").await?;

        Ok(parse_components(raw))
    }

    async fn set_component_status(
        &self,
        name: &str,
        status: ComponentStatus,
    ) -> Result<StatusToggleResponse, ControlPlaneError> {
        let payload = StatusToggleRequest {
            name: name.to_string(),
            status,
        };
        let response = self
            .send(
                self.http_client
                    .post(self.url(ENDPOINT_SYSTEM_STATUS))
                    .json(&payload),
                &Stage::System,
            )
            .await?;

        Self::decode(response, Stage::System, "Status toggle failed").await
    }

    async fn get_partition_servers(&self) -> Result<Vec<PartitionServerView>, ControlPlaneError> {
        let response = self
            .send(
                self.http_client.get(self.url(ENDPOINT_PARTITION_SERVERS)),
                &Stage::System,
            )
            .await?;

        Self::decode(response, Stage::System, "Partition server fetch failed").await
    }

    async fn get_leader_election_log(&self) -> Result<Vec<String>, ControlPlaneError> {
        let response = self
            .send(
                self.http_client.get(self.url(ENDPOINT_LEADER_ELECTION_LOG)),
                &Stage::System,
            )
            .await?;

        Self::decode(response, Stage::System, "Leader election log fetch failed").await
    }

    async fn resolve_partition_for_key(
        &self,
        filename: &str,
    ) -> Result<PartitionAssignment, ControlPlaneError> {
        let stage = Stage::Component(ComponentRole::PartitionManager);
        let url = format!(
            "{}?key={}",
            self.url(ENDPOINT_PARTITION_FOR_KEY),
            urlencoding::encode(filename)
        );
        let response = self.send(self.http_client.get(url), &stage).await?;

        Self::decode(response, stage, "Partition Manager could not resolve the key").await
    }

    async fn get_file_metadata(&self, filename: &str) -> Result<FileMetadata, ControlPlaneError> {
        let url = format!(
            "{}/{}",
            self.url(ENDPOINT_FILE_METADATA),
            urlencoding::encode(filename)
        );
        let response = self.send(self.http_client.get(url), &Stage::Metadata).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            let fallback = format!("File not found: {}", filename);
            let message = error_message(response, &fallback).await;
            return Err(ControlPlaneError::new(Stage::FileNotFound, message));
        }

        Self::decode(response, Stage::Metadata, "Metadata lookup failed").await
    }

    async fn fetch_from_stream_manager(
        &self,
        filename: &str,
    ) -> Result<StreamLocation, ControlPlaneError> {
        let stage = Stage::Component(ComponentRole::StreamManager);
        let payload = StreamGetFileRequest {
            filename: filename.to_string(),
        };
        let response = self
            .send(
                self.http_client
                    .post(self.url(ENDPOINT_STREAM_GET_FILE))
                    .json(&payload),
                &stage,
            )
            .await?;

        Self::decode(response, stage, "Stream Manager error").await
    }

    async fn retrieve_from_extent_node(
        &self,
        extent_node_id: &str,
    ) -> Result<FileChunk, ControlPlaneError> {
        let stage = match extent_node_id.parse::<ComponentRole>() {
            Ok(role) => Stage::Component(role),
            Err(_) => Stage::Component(ComponentRole::StreamManager),
        };
        let url = format!(
            "{}/{}",
            self.url(ENDPOINT_EXTENT_RETRIEVE),
            urlencoding::encode(extent_node_id)
        );
        let response = self.send(self.http_client.get(url), &stage).await?;

        Self::decode(response, stage, "Extent Node error").await
    }
}

/// Parses role names once at ingestion. Entries with names outside the known
/// namespace are dropped.
pub fn parse_components(raw: Vec<ComponentDto>) -> Snapshot {
    raw.into_iter()
        .filter_map(|dto| match dto.name.parse::<ComponentRole>() {
            Ok(role) => Some(Component::new(role, dto.status)),
            Err(e) => {
                tracing::warn!("Ignoring component: {}", e);
                None
            }
        })
        .collect()
}

async fn error_message(response: reqwest::Response, fallback: &str) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(message) }) if !message.is_empty() => message,
        _ => format!("{} (HTTP {})", fallback, status.as_u16()),
    }
}

fn normalize_base_url(candidate: &str) -> String {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    normalized.trim_end_matches('/').to_string()
}
