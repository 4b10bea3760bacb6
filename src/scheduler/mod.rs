//! Scheduler subsystem.
//!
//! This module provides the process scheduling core: a runtime-pluggable
//! policy picker, the MLFQ controller with aging and demotion, priority
//! inheritance across the `waiting_for` graph, and the per-CPU loop that
//! ties dispatch and time accounting together.
//!
//! ## Module organization
//!
//! - `types`: `SchedPolicy` and the constants the rest of the subsystem
//!   keys off of.
//! - `policy`: one pure picker per policy (RR, FIFO, SJF, STCF) plus the
//!   shared dispatch/tie-break mechanics.
//! - `mlfq`: level selection, aging, demotion.
//! - `inherit`: `reorient`, the priority-inheritance walk.
//! - `percpu`: the per-CPU scheduling loop, `yield_`, and the `current`
//!   process pointer per CPU.

pub mod inherit;
pub mod mlfq;
pub mod percpu;
pub mod policy;
pub mod types;

pub use inherit::reorient;
pub use percpu::{current, run, run_once, yield_};
pub use types::{policy as current_policy, set_policy, SchedPolicy, NCPU};
