use crate::topology::types::ComponentRole;
use std::fmt;

/// Where along the read path a control-plane call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Status, toggle, partition-server and leader-log endpoints.
    System,
    /// The metadata lookup reported that the file does not exist.
    FileNotFound,
    /// The metadata lookup failed for a reason other than a missing file.
    Metadata,
    /// A specific component on the path rejected or failed the request.
    Component(ComponentRole),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::System => f.write_str("system"),
            Stage::FileNotFound => f.write_str("file_not_found"),
            Stage::Metadata => f.write_str("metadata"),
            Stage::Component(role) => write!(f, "{}", role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{stage}] {message}")]
pub struct ControlPlaneError {
    pub stage: Stage,
    pub message: String,
}

impl ControlPlaneError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.stage == Stage::FileNotFound
    }
}
