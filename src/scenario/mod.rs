//! Scenario Resolver Module
//!
//! Maps an operator-chosen fault scenario to the single component that must be forced down
//! before a simulated GET, and performs that fault injection.
//!
//! ## Rules
//! - `all_healthy`, `file_not_found`: no change. A missing file is data, not infrastructure.
//! - `extent_down`: the first extent node that is currently up.
//! - `partition_down`: the Partition Manager.
//! - `frontend_down`: the Front-End Service.

pub mod resolver;
pub mod types;
