//! Object Storage Read-Path Simulator Library
//!
//! Animates a client GET through a distributed object-storage cluster, step by step, against a
//! live (or mock) control plane. Operators inject faults and watch where the read breaks.
//! The binary executable (`main.rs`) wires these modules into a small CLI.
//!
//! ## Architecture Modules
//! - **`topology`**: The current view of the cluster: which components exist and whether each
//!   one is up, plus the migration log, partition-server views and leader-election log.
//! - **`control_plane`**: Typed client for the cluster's HTTP endpoints, behind the
//!   `ControlPlane` trait so tests can script it.
//! - **`scenario`**: Named fault scenarios and the injection step that runs before every GET.
//! - **`simulator`**: The request-path state machine, the session that guards against
//!   overlapping runs, and event renderers.
//! - **`election`**: Bounded polling that watches the cluster elect a new Partition Manager.
//! - **`backend`**: An in-memory mock of the cluster, served over the same HTTP routes.

pub mod backend;
pub mod control_plane;
pub mod election;
pub mod scenario;
pub mod simulator;
pub mod topology;

#[cfg(test)]
pub(crate) mod testing;
