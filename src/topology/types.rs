use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

pub const FRONT_END_NAME: &str = "Front-End Service";
pub const PARTITION_MANAGER_NAME: &str = "Partition Manager";
pub const STREAM_MANAGER_NAME: &str = "Stream Manager";
pub const PARTITION_SERVER_PREFIX: &str = "Partition Server";
pub const EXTENT_NODE_PREFIX: &str = "Extent Node";

static INDEXED_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Partition Server|Extent Node) (\d+)$").expect("static regex is valid")
});

/// The diagram role of a cluster component.
///
/// Parsed once from the control plane's display names and carried as
/// structured data from then on. Indexed roles keep the numeric suffix of
/// their name (`"Extent Node 3"` → `ExtentNode(3)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentRole {
    FrontEnd,
    PartitionManager,
    StreamManager,
    PartitionServer(u32),
    ExtentNode(u32),
}

impl ComponentRole {
    pub fn is_extent_node(&self) -> bool {
        matches!(self, ComponentRole::ExtentNode(_))
    }

    pub fn is_partition_server(&self) -> bool {
        matches!(self, ComponentRole::PartitionServer(_))
    }
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentRole::FrontEnd => f.write_str(FRONT_END_NAME),
            ComponentRole::PartitionManager => f.write_str(PARTITION_MANAGER_NAME),
            ComponentRole::StreamManager => f.write_str(STREAM_MANAGER_NAME),
            ComponentRole::PartitionServer(n) => write!(f, "{} {}", PARTITION_SERVER_PREFIX, n),
            ComponentRole::ExtentNode(n) => write!(f, "{} {}", EXTENT_NODE_PREFIX, n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component name: {0:?}")]
pub struct UnknownComponent(pub String);

impl FromStr for ComponentRole {
    type Err = UnknownComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name {
            FRONT_END_NAME => return Ok(ComponentRole::FrontEnd),
            PARTITION_MANAGER_NAME => return Ok(ComponentRole::PartitionManager),
            STREAM_MANAGER_NAME => return Ok(ComponentRole::StreamManager),
            _ => {}
        }

        let caps = INDEXED_ROLE
            .captures(name)
            .ok_or_else(|| UnknownComponent(s.to_string()))?;
        let index: u32 = caps[2]
            .parse()
            .map_err(|_| UnknownComponent(s.to_string()))?;

        match &caps[1] {
            PARTITION_SERVER_PREFIX => Ok(ComponentRole::PartitionServer(index)),
            _ => Ok(ComponentRole::ExtentNode(index)),
        }
    }
}

impl Serialize for ComponentRole {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComponentRole {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentStatus::Up => f.write_str("up"),
            ComponentStatus::Down => f.write_str("down"),
        }
    }
}

impl FromStr for ComponentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(ComponentStatus::Up),
            "down" => Ok(ComponentStatus::Down),
            other => Err(format!("invalid status '{}', expected 'up' or 'down'", other)),
        }
    }
}

/// A single member of the simulated cluster as reported by the control plane.
///
/// On the wire the role is the component's display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
    #[serde(rename = "name")]
    pub role: ComponentRole,
    pub status: ComponentStatus,
}

impl Component {
    pub fn new(role: ComponentRole, status: ComponentStatus) -> Self {
        Self { role, status }
    }

    pub fn name(&self) -> String {
        self.role.to_string()
    }
}

/// Raw component entry before role parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDto {
    pub name: String,
    pub status: ComponentStatus,
}

/// The full, ordered view of all components at one point in time.
///
/// Never mutated in place: consumers that need fresher data fetch a new one.
pub type Snapshot = Vec<Component>;
