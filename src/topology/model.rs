use super::types::{Component, ComponentRole, ComponentStatus, Snapshot};
use crate::control_plane::client::ControlPlane;

use std::sync::Arc;
use tokio::sync::watch;

/// Holds the most recent topology snapshot fetched from the control plane.
///
/// Each fetch replaces the previous snapshot wholesale; nothing is merged.
/// Subscribers observe replacements through a `watch` channel.
pub struct TopologyModel {
    client: Arc<dyn ControlPlane>,
    latest: watch::Sender<Snapshot>,
}

impl TopologyModel {
    pub fn new(client: Arc<dyn ControlPlane>) -> Arc<Self> {
        let (latest, _) = watch::channel(Vec::new());
        Arc::new(Self { client, latest })
    }

    /// Fetches the current component statuses.
    ///
    /// Fails soft: a transport or decoding error yields (and publishes) an
    /// empty snapshot so callers can keep going offline.
    pub async fn fetch_status(&self) -> Snapshot {
        let snapshot = match self.client.get_system_status().await {
            Ok(snapshot) => {
                tracing::debug!("Fetched topology with {} components", snapshot.len());
                snapshot
            }
            Err(e) => {
                tracing::warn!("Status fetch failed, using empty topology: {}", e);
                Vec::new()
            }
        };

        self.latest.send_replace(snapshot.clone());
        snapshot
    }

    pub fn latest(&self) -> Snapshot {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.latest.subscribe()
    }
}

pub fn find_by_role<P>(snapshot: &[Component], predicate: P) -> Option<&Component>
where
    P: Fn(&ComponentRole) -> bool,
{
    snapshot.iter().find(|component| predicate(&component.role))
}

pub fn is_up(component: &Component) -> bool {
    component.status == ComponentStatus::Up
}

/// Status of `role` in `snapshot`, or `None` when the snapshot does not list it.
pub fn status_of(snapshot: &[Component], role: ComponentRole) -> Option<ComponentStatus> {
    find_by_role(snapshot, |r| *r == role).map(|c| c.status)
}
