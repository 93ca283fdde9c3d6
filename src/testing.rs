//! In-process `ControlPlane` double for unit tests.
//!
//! Every response can be scripted and every call is recorded, so tests can
//! assert both on outcomes and on which hops were attempted.

use crate::control_plane::client::ControlPlane;
use crate::control_plane::error::{ControlPlaneError, Stage};
use crate::control_plane::protocol::*;
use crate::topology::types::{Component, ComponentRole, ComponentStatus, Snapshot};

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct ScriptedControlPlane {
    pub components: Mutex<Snapshot>,
    pub status_unreachable: AtomicBool,
    pub migrations: Mutex<Vec<MigrationEntry>>,
    pub partition_servers: Mutex<Vec<PartitionServerView>>,
    pub leader_log: Mutex<Vec<String>>,
    /// Log reads after which the partition manager comes back with the sentinel.
    pub election_completes_after: Mutex<Option<usize>>,
    pub log_reads: AtomicUsize,
    pub partition: Mutex<Result<PartitionAssignment, ControlPlaneError>>,
    pub metadata: Mutex<Result<FileMetadata, ControlPlaneError>>,
    pub stream: Mutex<Result<StreamLocation, ControlPlaneError>>,
    pub extent: Mutex<Option<ControlPlaneError>>,
    pub calls: Mutex<Vec<String>>,
}

pub fn healthy_components() -> Snapshot {
    [
        ComponentRole::FrontEnd,
        ComponentRole::PartitionManager,
        ComponentRole::StreamManager,
        ComponentRole::PartitionServer(1),
        ComponentRole::PartitionServer(2),
        ComponentRole::ExtentNode(1),
        ComponentRole::ExtentNode(2),
        ComponentRole::ExtentNode(3),
        ComponentRole::ExtentNode(4),
    ]
    .into_iter()
    .map(|role| Component::new(role, ComponentStatus::Up))
    .collect()
}

impl ScriptedControlPlane {
    /// A healthy cluster that routes every key to `partition_server` and
    /// serves every file from `extent_node`.
    pub fn healthy(partition_server: &str, extent_node: &str) -> Self {
        Self {
            components: Mutex::new(healthy_components()),
            status_unreachable: AtomicBool::new(false),
            migrations: Mutex::new(Vec::new()),
            partition_servers: Mutex::new(Vec::new()),
            leader_log: Mutex::new(Vec::new()),
            election_completes_after: Mutex::new(None),
            log_reads: AtomicUsize::new(0),
            partition: Mutex::new(Ok(PartitionAssignment {
                partition_server: partition_server.to_string(),
                key: None,
            })),
            metadata: Mutex::new(Ok(FileMetadata {
                filename: "file".to_string(),
                primary_extent_node: extent_node.to_string(),
                secondary_extent_node1: None,
                secondary_extent_node2: None,
            })),
            stream: Mutex::new(Ok(StreamLocation {
                extent_node_id: extent_node.to_string(),
            })),
            extent: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, role: ComponentRole, status: ComponentStatus) {
        let mut components = self.components.lock().unwrap();
        if let Some(component) = components.iter_mut().find(|c| c.role == role) {
            component.status = status;
        }
    }

    pub fn status(&self, role: ComponentRole) -> Option<ComponentStatus> {
        self.components
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.role == role)
            .map(|c| c.status)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ControlPlane for ScriptedControlPlane {
    async fn get_system_status(&self) -> Result<Snapshot, ControlPlaneError> {
        self.record("get_system_status");
        if self.status_unreachable.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::new(Stage::System, "connection refused"));
        }
        Ok(self.components.lock().unwrap().clone())
    }

    async fn set_component_status(
        &self,
        name: &str,
        status: ComponentStatus,
    ) -> Result<StatusToggleResponse, ControlPlaneError> {
        self.record(&format!("set_component_status:{}:{}", name, status));
        if let Ok(role) = name.parse::<ComponentRole>() {
            self.set_status(role, status);
        }
        Ok(StatusToggleResponse {
            name: name.to_string(),
            status,
            migrations: self.migrations.lock().unwrap().clone(),
        })
    }

    async fn get_partition_servers(&self) -> Result<Vec<PartitionServerView>, ControlPlaneError> {
        self.record("get_partition_servers");
        Ok(self.partition_servers.lock().unwrap().clone())
    }

    async fn get_leader_election_log(&self) -> Result<Vec<String>, ControlPlaneError> {
        self.record("get_leader_election_log");
        let reads = self.log_reads.fetch_add(1, Ordering::SeqCst) + 1;
        let completes_after = *self.election_completes_after.lock().unwrap();
        if completes_after == Some(reads) {
            self.set_status(ComponentRole::PartitionManager, ComponentStatus::Up);
            self.leader_log
                .lock()
                .unwrap()
                .push(ELECTION_COMPLETE_SENTINEL.to_string());
        }
        Ok(self.leader_log.lock().unwrap().clone())
    }

    async fn resolve_partition_for_key(
        &self,
        _filename: &str,
    ) -> Result<PartitionAssignment, ControlPlaneError> {
        self.record("resolve_partition_for_key");
        self.partition.lock().unwrap().clone()
    }

    async fn get_file_metadata(&self, _filename: &str) -> Result<FileMetadata, ControlPlaneError> {
        self.record("get_file_metadata");
        self.metadata.lock().unwrap().clone()
    }

    async fn fetch_from_stream_manager(
        &self,
        _filename: &str,
    ) -> Result<StreamLocation, ControlPlaneError> {
        self.record("fetch_from_stream_manager");
        self.stream.lock().unwrap().clone()
    }

    async fn retrieve_from_extent_node(
        &self,
        extent_node_id: &str,
    ) -> Result<FileChunk, ControlPlaneError> {
        self.record(&format!("retrieve_from_extent_node:{}", extent_node_id));
        match self.extent.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(FileChunk {
                extent_node_id: extent_node_id.to_string(),
                chunk: "dummy-chunk-data".to_string(),
            }),
        }
    }
}
