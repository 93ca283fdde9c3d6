//! Request-Path Simulator Module
//!
//! Animates a single client GET through the cluster and reports how it ended.
//!
//! ## Architecture Overview
//! 1. **Session**: `Session::submit` injects the chosen scenario's fault, refreshes the topology
//!    and spawns the run on its own task. Only one run may be in flight at a time.
//! 2. **Engine**: `RequestPathSimulator` walks the forward path hop by hop, issuing one
//!    control-plane call per hop, then replays the path backwards on success.
//! 3. **Events**: Every visual step is sent as a `PresentationEvent` over a per-run channel.
//!    The stream ends with exactly one `Terminal` event.
//! 4. **Renderers**: Anything implementing `Renderer` can consume the stream (console, tracing,
//!    or a test collecting into a `Vec`).
//!
//! ## Submodules
//! - **`types`**: Runs, hops, outcomes and presentation events.
//! - **`engine`**: The forward/reverse state machine.
//! - **`session`**: Run guard, scenario application and the election poller hook.
//! - **`renderer`**: Event consumers.

pub mod engine;
pub mod renderer;
pub mod session;
pub mod types;
