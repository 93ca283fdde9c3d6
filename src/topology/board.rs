use crate::control_plane::client::ControlPlane;
use crate::control_plane::protocol::{MigrationEntry, PartitionServerView};

use tokio::sync::RwLock;

/// Everything besides component status that the operator's view shows.
///
/// Each collection is replaced on every fetch or toggle, never appended to.
/// A fetch that fails leaves an empty collection behind.
#[derive(Default)]
pub struct ClusterBoard {
    migrations: RwLock<Vec<MigrationEntry>>,
    partition_servers: RwLock<Vec<PartitionServerView>>,
    leader_log: RwLock<Vec<String>>,
}

impl ClusterBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace_migrations(&self, migrations: Vec<MigrationEntry>) {
        *self.migrations.write().await = migrations;
    }

    pub async fn migrations(&self) -> Vec<MigrationEntry> {
        self.migrations.read().await.clone()
    }

    pub async fn partition_servers(&self) -> Vec<PartitionServerView> {
        self.partition_servers.read().await.clone()
    }

    pub async fn leader_log(&self) -> Vec<String> {
        self.leader_log.read().await.clone()
    }

    pub async fn refresh_partition_servers(
        &self,
        client: &dyn ControlPlane,
    ) -> Vec<PartitionServerView> {
        let views = client.get_partition_servers().await.unwrap_or_else(|e| {
            tracing::warn!("Partition server fetch failed: {}", e);
            Vec::new()
        });
        *self.partition_servers.write().await = views.clone();
        views
    }

    pub async fn refresh_leader_log(&self, client: &dyn ControlPlane) -> Vec<String> {
        let log = client.get_leader_election_log().await.unwrap_or_else(|e| {
            tracing::warn!("Leader election log fetch failed: {}", e);
            Vec::new()
        });
        *self.leader_log.write().await = log.clone();
        log
    }
}
