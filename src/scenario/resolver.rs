use super::types::Scenario;
use crate::control_plane::client::ControlPlane;
use crate::control_plane::protocol::MigrationEntry;
use crate::topology::model::{TopologyModel, find_by_role, is_up};
use crate::topology::types::{ComponentRole, ComponentStatus, Snapshot};

/// What fault injection did before a run.
#[derive(Debug, Clone)]
pub struct AppliedScenario {
    pub scenario: Scenario,
    /// The component that was forced down, if any.
    pub forced_down: Option<ComponentRole>,
    /// Migration log returned by the toggle. `None` when no toggle was issued.
    pub migrations: Option<Vec<MigrationEntry>>,
    /// Topology fetched after the toggle. The run starts from this snapshot.
    pub snapshot: Snapshot,
}

/// Picks the component `scenario` must take down, given the current snapshot.
///
/// `extent_down` takes the first extent node that is currently up, in
/// snapshot order; when none is up there is nothing to do.
pub fn resolve_target(scenario: Scenario, snapshot: &Snapshot) -> Option<ComponentRole> {
    match scenario {
        Scenario::AllHealthy | Scenario::FileNotFound => None,
        Scenario::ExtentDown => snapshot
            .iter()
            .find(|c| c.role.is_extent_node() && is_up(c))
            .map(|c| c.role),
        Scenario::PartitionDown => Some(ComponentRole::PartitionManager),
        Scenario::FrontendDown => Some(ComponentRole::FrontEnd),
    }
}

/// Injects the scenario's fault and refreshes the topology.
///
/// The toggle completes before the refresh, and the refresh completes before
/// this returns, so a run started afterwards always observes the fault.
/// A target that is already down is not toggled again.
pub async fn apply(
    scenario: Scenario,
    topology: &TopologyModel,
    client: &dyn ControlPlane,
) -> AppliedScenario {
    let before = topology.fetch_status().await;

    let target = resolve_target(scenario, &before).filter(|role| {
        find_by_role(&before, |r| r == role).is_none_or(is_up)
    });

    let Some(role) = target else {
        tracing::debug!("Scenario {} needs no fault injection", scenario);
        return AppliedScenario {
            scenario,
            forced_down: None,
            migrations: None,
            snapshot: before,
        };
    };

    tracing::info!("Scenario {}: forcing {} down", scenario, role);

    let migrations = match client
        .set_component_status(&role.to_string(), ComponentStatus::Down)
        .await
    {
        Ok(resp) => {
            if !resp.migrations.is_empty() {
                tracing::info!("{} file(s) migrated off {}", resp.migrations.len(), role);
            }
            Some(resp.migrations)
        }
        Err(e) => {
            tracing::warn!("Failed to force {} down: {}", role, e);
            None
        }
    };

    let snapshot = topology.fetch_status().await;

    AppliedScenario {
        scenario,
        forced_down: migrations.as_ref().map(|_| role),
        migrations,
        snapshot,
    }
}
