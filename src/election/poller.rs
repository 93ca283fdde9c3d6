//! Leader-Election Reconciliation Poller
//!
//! After the Partition Manager is taken down, the control plane elects a new leader on its
//! own. This poller watches that happen: each iteration refreshes the topology, the
//! partition-server views and the leader-election log, then checks whether the Partition
//! Manager is back up *and* the log reports completion.
//!
//! It is a convergence poll, not a retry loop. Fetch errors are already swallowed by the
//! soft-fail wrappers and simply make the iteration see empty data.

use crate::control_plane::client::ControlPlane;
use crate::control_plane::protocol::ELECTION_COMPLETE_SENTINEL;
use crate::topology::board::ClusterBoard;
use crate::topology::model::{TopologyModel, status_of};
use crate::topology::types::{Component, ComponentRole, ComponentStatus, Snapshot};

use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_POLLS: u32 = 6;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Iterations before giving up. Always at least one iteration runs.
    pub max_polls: u32,
    /// Wait between two iterations.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Partition Manager up and the log reports a finished election.
    Converged,
    /// Retry budget used up. The last observed state stays on display.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub polls: u32,
    pub outcome: ReconcileOutcome,
    pub snapshot: Snapshot,
    pub leader_log: Vec<String>,
}

pub struct LeaderElectionPoller {
    client: Arc<dyn ControlPlane>,
    topology: Arc<TopologyModel>,
    board: Arc<ClusterBoard>,
    config: PollerConfig,
}

impl LeaderElectionPoller {
    pub fn new(
        client: Arc<dyn ControlPlane>,
        topology: Arc<TopologyModel>,
        board: Arc<ClusterBoard>,
        config: PollerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            topology,
            board,
            config,
        })
    }

    /// Runs the poll loop on its own task.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<ReconcileReport> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(&self) -> ReconcileReport {
        tracing::info!(
            "Watching leader election (max {} polls, every {:?})",
            self.config.max_polls,
            self.config.interval
        );

        let mut poll_count = 0u32;

        loop {
            poll_count += 1;

            let snapshot = self.topology.fetch_status().await;
            let servers = self.board.refresh_partition_servers(self.client.as_ref()).await;
            let leader_log = self.board.refresh_leader_log(self.client.as_ref()).await;

            tracing::debug!(
                "Election poll {}: {} partition server(s), {} log line(s)",
                poll_count,
                servers.len(),
                leader_log.len()
            );

            if election_complete(&snapshot, &leader_log) {
                tracing::info!("Leader election converged after {} poll(s)", poll_count);
                return ReconcileReport {
                    polls: poll_count,
                    outcome: ReconcileOutcome::Converged,
                    snapshot,
                    leader_log,
                };
            }

            if poll_count >= self.config.max_polls {
                tracing::warn!(
                    "Leader election not observed after {} poll(s), giving up",
                    poll_count
                );
                return ReconcileReport {
                    polls: poll_count,
                    outcome: ReconcileOutcome::Exhausted,
                    snapshot,
                    leader_log,
                };
            }

            tokio::time::sleep(self.config.interval).await;
        }
    }
}

pub fn election_complete(snapshot: &[Component], log: &[String]) -> bool {
    let manager_up =
        status_of(snapshot, ComponentRole::PartitionManager) == Some(ComponentStatus::Up);
    manager_up && log.iter().any(|line| line.contains(ELECTION_COMPLETE_SENTINEL))
}
