use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fault-injection preset chosen by the operator before a simulated GET.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    AllHealthy,
    ExtentDown,
    PartitionDown,
    FrontendDown,
    /// Simulated entirely by the control plane not knowing the filename.
    FileNotFound,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::AllHealthy,
        Scenario::ExtentDown,
        Scenario::PartitionDown,
        Scenario::FrontendDown,
        Scenario::FileNotFound,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::AllHealthy => "all_healthy",
            Scenario::ExtentDown => "extent_down",
            Scenario::PartitionDown => "partition_down",
            Scenario::FrontendDown => "frontend_down",
            Scenario::FileNotFound => "file_not_found",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.tag() == tag)
            .ok_or_else(|| {
                let known: Vec<&str> = Scenario::ALL.iter().map(|s| s.tag()).collect();
                format!("unknown scenario '{}', expected one of: {}", s, known.join(", "))
            })
    }
}
