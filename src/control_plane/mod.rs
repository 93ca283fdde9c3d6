//! Control-Plane Client Module
//!
//! Thin typed wrapper around the storage control plane's HTTP API.
//!
//! ## Contract
//! - **Single shot**: every operation is exactly one request/response; nothing is retried here.
//! - **Tagged failures**: transport errors and non-2xx responses become a `ControlPlaneError`
//!   carrying the `Stage` of the read path that failed, so callers can decide what to mark down.
//! - **Seam**: the `ControlPlane` trait lets the simulator run against the HTTP client or any
//!   in-process implementation.

pub mod client;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod tests;
