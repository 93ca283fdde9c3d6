//! Simulation Session
//!
//! The controller object a front end talks to. It owns the collaborators of one operator
//! session (control-plane client, topology model, board, simulator) and enforces that at
//! most one simulated GET is in flight at a time.

use super::engine::{EventEmitter, RequestPathSimulator, RunEvents};
use super::renderer::{Renderer, drive};
use super::types::*;
use crate::control_plane::client::ControlPlane;
use crate::control_plane::error::ControlPlaneError;
use crate::control_plane::protocol::{MigrationEntry, PartitionServerView};
use crate::election::poller::{LeaderElectionPoller, PollerConfig, ReconcileReport};
use crate::scenario::resolver::apply;
use crate::scenario::types::Scenario;
use crate::topology::board::ClusterBoard;
use crate::topology::model::TopologyModel;
use crate::topology::types::{ComponentRole, ComponentStatus, Snapshot};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a simulation run is already in progress")]
    RunInProgress,

    #[error("filename must not be empty")]
    EmptyFilename,
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub simulator: SimulatorConfig,
    pub poller: PollerConfig,
}

/// Clears the in-flight flag when dropped, including on panic.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session {
    client: Arc<dyn ControlPlane>,
    topology: Arc<TopologyModel>,
    board: Arc<ClusterBoard>,
    simulator: RequestPathSimulator,
    poller_config: PollerConfig,
    running: Arc<AtomicBool>,
    reconciliation: Mutex<Option<JoinHandle<ReconcileReport>>>,
}

impl Session {
    pub fn new(client: Arc<dyn ControlPlane>, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            topology: TopologyModel::new(client.clone()),
            board: Arc::new(ClusterBoard::new()),
            simulator: RequestPathSimulator::new(client.clone(), config.simulator),
            poller_config: config.poller,
            running: Arc::new(AtomicBool::new(false)),
            reconciliation: Mutex::new(None),
            client,
        })
    }

    pub fn topology(&self) -> &Arc<TopologyModel> {
        &self.topology
    }

    pub fn board(&self) -> &Arc<ClusterBoard> {
        &self.board
    }

    /// True between a successful `submit` and its terminal event.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts a simulated GET of `filename` under `scenario`.
    ///
    /// The scenario's fault is injected and the topology refreshed before the
    /// first hop. When the Partition Manager was forced down, the election
    /// poller starts after the run's outcome is known. Returns the run's event
    /// stream, or `RunInProgress` while an earlier run has not yet emitted its
    /// terminal event.
    pub fn submit(
        self: &Arc<Self>,
        filename: &str,
        scenario: Scenario,
    ) -> Result<RunEvents, SessionError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(SessionError::EmptyFilename);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Rejected GET '{}': a run is already in progress", filename);
            return Err(SessionError::RunInProgress);
        }
        let guard = RunGuard(self.running.clone());

        let mut run = SimulationRun::new(filename, scenario);
        let (tx, rx) = mpsc::channel(self.simulator.config().event_buffer.max(1));
        let events = RunEvents::new(run.id.clone(), rx);
        let emitter = EventEmitter::new(tx);

        let session = self.clone();
        tokio::spawn(async move {
            let applied = apply(scenario, &session.topology, session.client.as_ref()).await;

            if let Some(migrations) = applied.migrations {
                session.board.replace_migrations(migrations).await;
            }
            let outcome = session
                .simulator
                .simulate(&mut run, &applied.snapshot, &emitter)
                .await;

            // The poller drives the election forward, so it only starts once
            // the run has observed the fault.
            if applied.forced_down == Some(ComponentRole::PartitionManager) {
                session.start_reconciliation().await;
            }

            // Accept the next submission before the renderer sees the end.
            drop(guard);
            emitter.emit(PresentationEvent::Terminal { outcome }).await;
        });

        Ok(events)
    }

    /// Operator status toggle.
    ///
    /// Replaces the migration log with the toggle's result and refreshes the
    /// topology. Taking the Partition Manager down starts the election poller.
    pub async fn toggle(
        &self,
        name: &str,
        status: ComponentStatus,
    ) -> Result<Vec<MigrationEntry>, ControlPlaneError> {
        tracing::info!("Setting {} {}", name, status);

        let resp = self.client.set_component_status(name, status).await?;
        self.board.replace_migrations(resp.migrations.clone()).await;
        self.topology.fetch_status().await;

        if status == ComponentStatus::Down
            && name.parse::<ComponentRole>() == Ok(ComponentRole::PartitionManager)
        {
            self.start_reconciliation().await;
        }

        Ok(resp.migrations)
    }

    pub async fn migrations(&self) -> Vec<MigrationEntry> {
        self.board.migrations().await
    }

    pub async fn leader_log(&self) -> Vec<String> {
        self.board.leader_log().await
    }

    pub async fn partition_servers(&self) -> Vec<PartitionServerView> {
        self.board.partition_servers().await
    }

    /// Drives `renderer` through a run's events. Returns the terminal outcome.
    pub async fn render(&self, events: RunEvents, renderer: &mut dyn Renderer) -> Option<Outcome> {
        drive(events, renderer).await
    }

    /// Refreshes topology, partition servers and leader log. Never fails.
    pub async fn refresh(&self) -> Snapshot {
        let snapshot = self.topology.fetch_status().await;
        self.board.refresh_partition_servers(self.client.as_ref()).await;
        self.board.refresh_leader_log(self.client.as_ref()).await;
        snapshot
    }

    /// Waits for the current election poller, if one was started.
    pub async fn wait_for_reconciliation(&self) -> Option<ReconcileReport> {
        let handle = self.reconciliation.lock().await.take()?;
        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Election poller task failed: {}", e);
                None
            }
        }
    }

    async fn start_reconciliation(&self) {
        let mut slot = self.reconciliation.lock().await;
        if let Some(handle) = slot.as_ref()
            && !handle.is_finished()
        {
            tracing::debug!("Election poller already running");
            return;
        }

        let poller = LeaderElectionPoller::new(
            self.client.clone(),
            self.topology.clone(),
            self.board.clone(),
            self.poller_config.clone(),
        );
        *slot = Some(poller.spawn());
    }
}
