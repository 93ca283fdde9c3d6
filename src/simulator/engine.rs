//! Request-Path State Machine
//!
//! Walks one simulated GET through the cluster:
//!
//! 1. **Forward walk**: Front-End → Partition Manager → Front-End → Partition Server →
//!    Stream Manager → Extent Node. Each hop is highlighted, then the presentation delay
//!    elapses, then the hop's control-plane call is issued. The next hop is not known until
//!    the previous call returns (the partition server comes from the key lookup, the extent
//!    node from the stream manager).
//! 2. **Short circuit**: The first failing call ends the run. The failing component is
//!    painted down unless the failure is a missing file.
//! 3. **Reverse walk**: After a full forward walk, the same hops are replayed backwards
//!    without any control-plane calls.

use super::types::*;
use crate::control_plane::client::ControlPlane;
use crate::control_plane::error::{ControlPlaneError, Stage};
use crate::topology::model::status_of;
use crate::topology::types::{ComponentRole, ComponentStatus, Snapshot};

use std::sync::Arc;
use tokio::sync::mpsc;

/// Sending half of a run's event stream.
///
/// A renderer that stops listening does not stop the run.
#[derive(Clone)]
pub struct EventEmitter {
    tx: mpsc::Sender<PresentationEvent>,
}

impl EventEmitter {
    pub fn new(tx: mpsc::Sender<PresentationEvent>) -> Self {
        Self { tx }
    }

    pub async fn emit(&self, event: PresentationEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Renderer went away, dropping presentation event");
        }
    }
}

/// Receiving half of a run's event stream. Finite and not restartable:
/// it ends right after the `Terminal` event.
pub struct RunEvents {
    run_id: RunId,
    rx: mpsc::Receiver<PresentationEvent>,
}

impl RunEvents {
    pub fn new(run_id: RunId, rx: mpsc::Receiver<PresentationEvent>) -> Self {
        Self { run_id, rx }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub async fn next(&mut self) -> Option<PresentationEvent> {
        self.rx.recv().await
    }

    pub async fn collect(mut self) -> Vec<PresentationEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}

pub struct RequestPathSimulator {
    client: Arc<dyn ControlPlane>,
    config: SimulatorConfig,
}

impl RequestPathSimulator {
    pub fn new(client: Arc<dyn ControlPlane>, config: SimulatorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Runs the forward walk and, if it succeeds, the reverse walk.
    ///
    /// Emits every highlight and mark-down event but not the terminal event;
    /// the returned outcome is what the caller reports as terminal.
    pub async fn simulate(
        &self,
        run: &mut SimulationRun,
        snapshot: &Snapshot,
        emitter: &EventEmitter,
    ) -> Outcome {
        tracing::info!(
            "Run {}: GET '{}' under scenario {}",
            run.id,
            run.filename,
            run.scenario
        );

        let outcome = match self.forward(run, snapshot, emitter).await {
            Ok(location) => {
                self.reverse(run, emitter).await;
                Outcome::Success {
                    location,
                    message: format!("File '{}' retrieved from {}.", run.filename, location),
                }
            }
            Err(failure) => {
                if let Outcome::Failure {
                    failed: Some(component),
                    ..
                } = &failure
                {
                    emitter
                        .emit(PresentationEvent::MarkDown {
                            component: *component,
                        })
                        .await;
                }
                failure
            }
        };

        run.transition(RunState::Terminal);
        match &outcome {
            Outcome::Success { location, .. } => {
                tracing::info!("Run {}: served by {}", run.id, location)
            }
            Outcome::Failure { stage, message, .. } => {
                tracing::warn!("Run {}: failed at {}: {}", run.id, stage, message)
            }
        }

        outcome
    }

    /// `simulate` followed by the terminal event.
    pub async fn run(
        &self,
        run: &mut SimulationRun,
        snapshot: &Snapshot,
        emitter: &EventEmitter,
    ) -> Outcome {
        let outcome = self.simulate(run, snapshot, emitter).await;
        emitter
            .emit(PresentationEvent::Terminal {
                outcome: outcome.clone(),
            })
            .await;
        outcome
    }

    async fn forward(
        &self,
        run: &mut SimulationRun,
        snapshot: &Snapshot,
        emitter: &EventEmitter,
    ) -> Result<ComponentRole, Outcome> {
        let front_end = ComponentRole::FrontEnd;
        emitter
            .emit(PresentationEvent::HighlightBox {
                component: front_end,
            })
            .await;

        if status_of(snapshot, front_end) == Some(ComponentStatus::Down) {
            return Err(Outcome::Failure {
                stage: Stage::Component(front_end),
                failed: Some(front_end),
                message: format!("{} is down. System unavailable.", front_end),
            });
        }

        // Front-End -> Partition Manager: which partition server owns the key?
        let manager = ComponentRole::PartitionManager;
        self.step(run, Hop::new(front_end, manager), emitter).await;
        let assignment = self
            .client
            .resolve_partition_for_key(&run.filename)
            .await
            .map_err(|e| failure_at(manager, e))?;
        let partition_server = parse_assigned(
            &assignment.partition_server,
            ComponentRole::is_partition_server,
        )
        .ok_or_else(|| {
            failure_at(
                manager,
                ControlPlaneError::new(
                    Stage::Component(manager),
                    format!("Unknown partition server '{}'", assignment.partition_server),
                ),
            )
        })?;

        // Return leg to the front end, presentation only.
        self.step(run, Hop::new(manager, front_end), emitter).await;

        // Front-End -> Partition Server: does the file exist?
        self.step(run, Hop::new(front_end, partition_server), emitter)
            .await;
        let metadata = self
            .client
            .get_file_metadata(&run.filename)
            .await
            .map_err(|e| failure_at(partition_server, e))?;
        tracing::debug!(
            "Run {}: metadata lists primary {}",
            run.id,
            metadata.primary_extent_node
        );

        // Partition Server -> Stream Manager: which live extent node holds it?
        let stream_manager = ComponentRole::StreamManager;
        self.step(run, Hop::new(partition_server, stream_manager), emitter)
            .await;
        let location = self
            .client
            .fetch_from_stream_manager(&run.filename)
            .await
            .map_err(|e| failure_at(stream_manager, e))?;
        let extent_node = parse_assigned(&location.extent_node_id, ComponentRole::is_extent_node)
            .ok_or_else(|| {
                failure_at(
                    stream_manager,
                    ControlPlaneError::new(
                        Stage::Component(stream_manager),
                        format!("Unknown extent node '{}'", location.extent_node_id),
                    ),
                )
            })?;

        // Stream Manager -> Extent Node: fetch the chunk.
        self.step(run, Hop::new(stream_manager, extent_node), emitter)
            .await;
        let chunk = self
            .client
            .retrieve_from_extent_node(&location.extent_node_id)
            .await
            .map_err(|e| failure_at(extent_node, e))?;
        tracing::debug!(
            "Run {}: {} returned {} byte(s)",
            run.id,
            extent_node,
            chunk.chunk.len()
        );

        Ok(extent_node)
    }

    /// Highlights the destination of `hop`, records it, then waits the hop delay.
    async fn step(&self, run: &mut SimulationRun, hop: Hop, emitter: &EventEmitter) {
        run.hops.push(hop);
        run.transition(RunState::ForwardHop(run.hops.len() - 1));
        tracing::debug!("Run {}: forward {}", run.id, hop);

        emitter
            .emit(PresentationEvent::HighlightBox { component: hop.to })
            .await;
        emitter
            .emit(PresentationEvent::HighlightArrow {
                hop,
                direction: Direction::Forward,
            })
            .await;

        tokio::time::sleep(self.config.hop_delay).await;
    }

    async fn reverse(&self, run: &mut SimulationRun, emitter: &EventEmitter) {
        let hops: Vec<Hop> = run.hops.iter().rev().copied().collect();

        for (i, hop) in hops.into_iter().enumerate() {
            run.transition(RunState::ReverseHop(i));
            tracing::debug!("Run {}: reverse {}", run.id, hop);

            emitter
                .emit(PresentationEvent::HighlightBox {
                    component: hop.from,
                })
                .await;
            emitter
                .emit(PresentationEvent::HighlightArrow {
                    hop,
                    direction: Direction::Reverse,
                })
                .await;

            tokio::time::sleep(self.config.hop_delay).await;
        }
    }
}

/// Turns a failed call at `component` into a terminal failure.
/// A missing file fails the run without blaming any component.
fn failure_at(component: ComponentRole, err: ControlPlaneError) -> Outcome {
    let failed = if err.is_not_found() {
        None
    } else {
        Some(component)
    };

    Outcome::Failure {
        stage: err.stage,
        failed,
        message: err.message,
    }
}

fn parse_assigned(name: &str, expected: fn(&ComponentRole) -> bool) -> Option<ComponentRole> {
    name.parse::<ComponentRole>()
        .ok()
        .filter(|role| expected(role))
}
