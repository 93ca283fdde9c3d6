use crate::control_plane::error::Stage;
use crate::scenario::types::Scenario;
use crate::topology::types::ComponentRole;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

const DEFAULT_HOP_DELAY: Duration = Duration::from_millis(600);
const DEFAULT_EVENT_BUFFER: usize = 32;

/// Unique identifier of one simulated GET.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Presentation delay between two consecutive hops, in both directions.
    pub hop_delay: Duration,
    /// Capacity of the per-run event channel.
    pub event_buffer: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            hop_delay: DEFAULT_HOP_DELAY,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

/// One leg of the simulated request path.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Hop {
    pub from: ComponentRole,
    pub to: ComponentRole,
}

impl Hop {
    pub fn new(from: ComponentRole, to: ComponentRole) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        /// Extent node that served the payload.
        location: ComponentRole,
        message: String,
    },
    Failure {
        stage: Stage,
        /// Component shown as down. `None` when the fault is data, not infrastructure.
        failed: Option<ComponentRole>,
        message: String,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message, .. } | Outcome::Failure { message, .. } => message,
        }
    }
}

/// What a renderer is asked to draw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    HighlightBox { component: ComponentRole },
    HighlightArrow { hop: Hop, direction: Direction },
    /// Paint a component as down, whatever the topology says.
    MarkDown { component: ComponentRole },
    Terminal { outcome: Outcome },
}

/// Position of a run in its state machine. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ForwardHop(usize),
    ReverseHop(usize),
    Terminal,
}

/// Ephemeral record of one simulated GET.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub id: RunId,
    pub filename: String,
    pub scenario: Scenario,
    pub state: RunState,
    /// Forward hops actually taken, in order.
    pub hops: Vec<Hop>,
}

impl SimulationRun {
    pub fn new(filename: &str, scenario: Scenario) -> Self {
        Self {
            id: RunId::new(),
            filename: filename.to_string(),
            scenario,
            state: RunState::Idle,
            hops: Vec::new(),
        }
    }

    /// Boxes highlighted by the forward walk, starting at the front end.
    pub fn forward_visits(&self) -> Vec<ComponentRole> {
        let mut visits = Vec::with_capacity(self.hops.len() + 1);
        if let Some(first) = self.hops.first() {
            visits.push(first.from);
        }
        visits.extend(self.hops.iter().map(|hop| hop.to));
        visits
    }

    pub(crate) fn transition(&mut self, next: RunState) {
        tracing::trace!("Run {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}
