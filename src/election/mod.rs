//! Leader Election Module
//!
//! Observes the cluster healing itself after the Partition Manager loses leadership.
//! The control plane runs the (simulated) election; this module only reconciles against
//! what it reports, within a bounded number of polls.

pub mod poller;
