//! Topology Module
//!
//! The simulator's view of the cluster: which components exist and whether each one is up.
//!
//! ## Core Concepts
//! - **Roles**: Component names from the control plane are parsed once into `ComponentRole`
//!   (`FrontEnd`, `PartitionManager`, `StreamManager`, `PartitionServer(n)`, `ExtentNode(n)`).
//! - **Snapshots**: The model never owns the authoritative state. Every fetch is treated as the
//!   current truth and replaces the previous snapshot wholesale.
//! - **Soft failure**: A failed status fetch degrades to an empty snapshot instead of an error.
//! - **Board**: Migration log, partition-server views and the leader-election log live next to
//!   the snapshot in `ClusterBoard`, with the same replace-on-fetch semantics.

pub mod board;
pub mod model;
pub mod types;

#[cfg(test)]
mod tests;
