use crate::control_plane::protocol::{
    ELECTION_COMPLETE_SENTINEL, FileChunk, FileEntry, FileMetadata, MigrationEntry,
    PartitionServerView, StatusToggleResponse,
};
use crate::topology::types::{ComponentDto, ComponentRole, ComponentStatus};

use dashmap::DashMap;
use rand::seq::SliceRandom;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const DEFAULT_PARTITION_SERVERS: u32 = 2;
const DEFAULT_EXTENT_NODES: u32 = 4;
const DEFAULT_ELECTION_STEPS: u32 = 3;
const CHUNK_PAYLOAD: &str = "dummy-chunk-data";

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub partition_servers: u32,
    pub extent_nodes: u32,
    /// Leader-log reads an election takes before the Partition Manager is back.
    pub election_steps: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            partition_servers: DEFAULT_PARTITION_SERVERS,
            extent_nodes: DEFAULT_EXTENT_NODES,
            election_steps: DEFAULT_ELECTION_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),
}

/// A stored object. The first replica is its current location.
#[derive(Debug, Clone)]
struct StoredFile {
    name: String,
    replicas: Vec<ComponentRole>,
}

impl StoredFile {
    fn new(name: &str, replicas: &[u32]) -> Self {
        Self {
            name: name.to_string(),
            replicas: replicas.iter().map(|n| ComponentRole::ExtentNode(*n)).collect(),
        }
    }

    fn location(&self) -> Option<ComponentRole> {
        self.replicas.first().copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct Election {
    step: u32,
}

/// In-memory control plane and data path of a small object-storage cluster.
pub struct MockCluster {
    components: DashMap<ComponentRole, ComponentStatus>,
    files: RwLock<Vec<StoredFile>>,
    migration_log: RwLock<Vec<MigrationEntry>>,
    leader_log: RwLock<Vec<String>>,
    election: Mutex<Option<Election>>,
    partition_servers: Vec<ComponentRole>,
    config: MockConfig,
}

impl MockCluster {
    pub fn new(config: MockConfig) -> Arc<Self> {
        let components = DashMap::new();
        components.insert(ComponentRole::FrontEnd, ComponentStatus::Up);
        components.insert(ComponentRole::PartitionManager, ComponentStatus::Up);
        components.insert(ComponentRole::StreamManager, ComponentStatus::Up);

        let partition_servers: Vec<ComponentRole> = (1..=config.partition_servers.max(1))
            .map(ComponentRole::PartitionServer)
            .collect();
        for ps in &partition_servers {
            components.insert(*ps, ComponentStatus::Up);
        }
        for n in 1..=config.extent_nodes.max(1) {
            components.insert(ComponentRole::ExtentNode(n), ComponentStatus::Up);
        }

        let extent_nodes = config.extent_nodes.max(1);
        let replicas = |first: u32| -> Vec<u32> {
            (0..3u32.min(extent_nodes))
                .map(|i| (first - 1 + i) % extent_nodes + 1)
                .collect()
        };
        let files = vec![
            StoredFile::new("report.pdf", &replicas(1)),
            StoredFile::new("photo.jpg", &replicas(2u32.min(extent_nodes))),
            StoredFile::new("notes.txt", &replicas(3u32.min(extent_nodes))),
        ];

        tracing::info!(
            "Mock cluster: {} partition server(s), {} extent node(s), {} file(s)",
            partition_servers.len(),
            extent_nodes,
            files.len()
        );

        Arc::new(Self {
            components,
            files: RwLock::new(files),
            migration_log: RwLock::new(Vec::new()),
            leader_log: RwLock::new(vec!["Partition Manager replica 1 is leader".to_string()]),
            election: Mutex::new(None),
            partition_servers,
            config,
        })
    }

    fn status(&self, role: ComponentRole) -> ComponentStatus {
        self.components
            .get(&role)
            .map(|entry| *entry.value())
            .unwrap_or(ComponentStatus::Up)
    }

    fn is_up(&self, role: ComponentRole) -> bool {
        self.status(role) == ComponentStatus::Up
    }

    /// Every component, in diagram order.
    pub fn system_status(&self) -> Vec<ComponentDto> {
        let mut entries: Vec<(ComponentRole, ComponentStatus)> = self
            .components
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        entries.sort_by_key(|(role, _)| *role);

        entries
            .into_iter()
            .map(|(role, status)| ComponentDto {
                name: role.to_string(),
                status,
            })
            .collect()
    }

    /// Operator toggle. Unknown names are ignored and reported as up.
    pub async fn set_status(&self, name: &str, status: ComponentStatus) -> StatusToggleResponse {
        let role = match name.parse::<ComponentRole>() {
            Ok(role) if self.components.contains_key(&role) => role,
            _ => {
                tracing::warn!("Toggle for unknown component '{}' ignored", name);
                return StatusToggleResponse {
                    name: name.to_string(),
                    status: ComponentStatus::Up,
                    migrations: Vec::new(),
                };
            }
        };

        let previous = self.status(role);
        let mut migrations = Vec::new();

        if previous == ComponentStatus::Up && status == ComponentStatus::Down {
            if role.is_extent_node() {
                migrations = self.migrate_off(role).await;
            } else if role == ComponentRole::PartitionManager {
                self.start_election().await;
            }
        }
        if role == ComponentRole::PartitionManager
            && status == ComponentStatus::Up
            && self.election.lock().await.take().is_some()
        {
            self.leader_log.write().await.push(format!(
                "{}: Partition Manager restored by operator",
                ELECTION_COMPLETE_SENTINEL
            ));
        }

        self.components.insert(role, status);
        tracing::info!("{} is now {}", role, status);

        StatusToggleResponse {
            name: role.to_string(),
            status,
            migrations,
        }
    }

    /// Moves every file located on `node` to a random other up extent node.
    async fn migrate_off(&self, node: ComponentRole) -> Vec<MigrationEntry> {
        let available: Vec<ComponentRole> = self
            .components
            .iter()
            .filter(|entry| {
                entry.key().is_extent_node()
                    && *entry.key() != node
                    && *entry.value() == ComponentStatus::Up
            })
            .map(|entry| *entry.key())
            .collect();

        let mut migrations = Vec::new();
        let mut files = self.files.write().await;
        {
            let mut rng = rand::thread_rng();
            for file in files.iter_mut().filter(|f| f.location() == Some(node)) {
                let Some(target) = available.choose(&mut rng).copied() else {
                    tracing::warn!("No extent node left to take {}", file.name);
                    continue;
                };
                file.replicas.retain(|r| *r != target);
                file.replicas.insert(0, target);
                migrations.push(MigrationEntry {
                    file: file.name.clone(),
                    from: node.to_string(),
                    to: target.to_string(),
                });
            }
        }
        drop(files);

        if !migrations.is_empty() {
            tracing::info!("Migrated {} file(s) off {}", migrations.len(), node);
            self.migration_log
                .write()
                .await
                .extend(migrations.iter().cloned());
        }
        migrations
    }

    async fn start_election(&self) {
        let mut election = self.election.lock().await;
        if election.is_some() {
            return;
        }
        *election = Some(Election { step: 0 });

        let mut log = self.leader_log.write().await;
        log.clear();
        log.push("Partition Manager leader lost".to_string());
        log.push("Starting leader election".to_string());
        tracing::info!("Leader election started");
    }

    /// Every read advances a running election by one step.
    pub async fn leader_log(&self) -> Vec<String> {
        let mut election = self.election.lock().await;
        if let Some(state) = election.as_mut() {
            state.step += 1;
            let mut log = self.leader_log.write().await;

            if state.step >= self.config.election_steps {
                log.push(format!(
                    "{}: Partition Manager replica 2 is leader",
                    ELECTION_COMPLETE_SENTINEL
                ));
                self.components
                    .insert(ComponentRole::PartitionManager, ComponentStatus::Up);
                *election = None;
                tracing::info!("Leader election finished");
            } else {
                log.push(format!("Election round {}: collecting votes", state.step));
            }
        }
        drop(election);

        self.leader_log.read().await.clone()
    }

    pub async fn migration_log(&self) -> Vec<MigrationEntry> {
        self.migration_log.read().await.clone()
    }

    pub async fn files(&self) -> Vec<FileEntry> {
        self.files
            .read()
            .await
            .iter()
            .map(|f| FileEntry {
                name: f.name.clone(),
                location: f.location().map(|r| r.to_string()).unwrap_or_default(),
            })
            .collect()
    }

    /// Owner of `key` among the partition servers, by hash.
    fn owner_of(&self, key: &str) -> ComponentRole {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.partition_servers.len() as u64) as usize;
        self.partition_servers[index]
    }

    pub fn partition_for_key(&self, key: &str) -> Result<ComponentRole, MockError> {
        if !self.is_up(ComponentRole::PartitionManager) {
            return Err(MockError::Unavailable(
                "Partition Manager is down".to_string(),
            ));
        }
        Ok(self.owner_of(key))
    }

    pub async fn partition_servers(&self) -> Vec<PartitionServerView> {
        let files = self.files.read().await;

        self.partition_servers
            .iter()
            .map(|ps| PartitionServerView {
                name: ps.to_string(),
                status: self.status(*ps),
                files: files
                    .iter()
                    .filter(|f| self.owner_of(&f.name) == *ps)
                    .map(|f| f.name.clone())
                    .collect(),
            })
            .collect()
    }

    pub async fn metadata(&self, filename: &str) -> Result<FileMetadata, MockError> {
        let files = self.files.read().await;
        let file = files
            .iter()
            .find(|f| f.name == filename)
            .ok_or_else(|| MockError::NotFound(format!("File not found: {}", filename)))?;

        let owner = self.owner_of(filename);
        if !self.is_up(owner) {
            return Err(MockError::Unavailable(format!("{} is down", owner)));
        }

        let replica = |i: usize| file.replicas.get(i).map(|r| r.to_string());
        Ok(FileMetadata {
            filename: file.name.clone(),
            primary_extent_node: replica(0).unwrap_or_default(),
            secondary_extent_node1: replica(1),
            secondary_extent_node2: replica(2),
        })
    }

    /// First up extent node holding `filename`, location first.
    pub async fn locate(&self, filename: &str) -> Result<ComponentRole, MockError> {
        if !self.is_up(ComponentRole::StreamManager) {
            return Err(MockError::Unavailable("Stream Manager is down".to_string()));
        }

        let files = self.files.read().await;
        let file = files
            .iter()
            .find(|f| f.name == filename)
            .ok_or_else(|| MockError::NotFound(format!("File not found: {}", filename)))?;

        file.replicas
            .iter()
            .copied()
            .find(|r| self.is_up(*r))
            .ok_or_else(|| {
                MockError::Unavailable("All extent nodes for this file are down".to_string())
            })
    }

    pub fn retrieve(&self, extent_node_id: &str) -> Result<FileChunk, MockError> {
        let role = extent_node_id
            .parse::<ComponentRole>()
            .ok()
            .filter(|r| r.is_extent_node() && self.components.contains_key(r))
            .ok_or_else(|| MockError::NotFound(format!("Unknown extent node: {}", extent_node_id)))?;

        if !self.is_up(role) {
            return Err(MockError::Unavailable("Extent Node is down".to_string()));
        }

        Ok(FileChunk {
            extent_node_id: role.to_string(),
            chunk: CHUNK_PAYLOAD.to_string(),
        })
    }
}
