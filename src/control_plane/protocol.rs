//! Control Plane Wire Protocol
//!
//! Endpoint paths and Data Transfer Objects (DTOs) exchanged with the storage
//! control plane. Field names follow the control plane's camelCase JSON.
//!
//! The same types are used by the HTTP client and by the mock backend, so the
//! two sides cannot drift apart.

use crate::topology::types::ComponentStatus;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Component status listing (GET) and status toggle (POST).
pub const ENDPOINT_SYSTEM_STATUS: &str = "/files/system/status";
/// Partition servers with the files each one is responsible for.
pub const ENDPOINT_PARTITION_SERVERS: &str = "/files/partition-servers";
/// Human-readable log of the partition manager's leader election.
pub const ENDPOINT_LEADER_ELECTION_LOG: &str = "/files/partition-manager/leader-election-log";
/// Key to partition-server assignment, `?key=<filename>`.
pub const ENDPOINT_PARTITION_FOR_KEY: &str = "/partition-manager/partition-for-key";
/// File metadata lookup, `/<filename>` appended.
pub const ENDPOINT_FILE_METADATA: &str = "/partition-server/file";
/// Stream manager lookup of a live extent node for a file.
pub const ENDPOINT_STREAM_GET_FILE: &str = "/stream-manager/get-file";
/// Chunk retrieval, `/<extentNodeId>` appended.
pub const ENDPOINT_EXTENT_RETRIEVE: &str = "/extent-node/retrieve";

/// Phrase the partition manager appends to its log once a new leader is in place.
pub const ELECTION_COMPLETE_SENTINEL: &str = "Leader election complete";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusToggleRequest {
    pub name: String,
    pub status: ComponentStatus,
}

/// One file moved off an extent node that went down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationEntry {
    pub file: String,
    pub from: String,
    pub to: String,
}

/// Response to a status toggle. `status` echoes the component's resulting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusToggleResponse {
    pub name: String,
    pub status: ComponentStatus,
    #[serde(default)]
    pub migrations: Vec<MigrationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionServerView {
    pub name: String,
    pub status: ComponentStatus,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionAssignment {
    pub partition_server: String,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub filename: String,
    pub primary_extent_node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_extent_node1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_extent_node2: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamGetFileRequest {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLocation {
    pub extent_node_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileChunk {
    pub extent_node_id: String,
    pub chunk: String,
}

/// Body of a failed data-path response. Only `error` is looked at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Entry of the `/files` listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub location: String,
}
