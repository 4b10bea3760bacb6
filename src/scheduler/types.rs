//! Scheduler-wide type definitions: the runtime-pluggable policy, the CPU
//! count this crate models, and re-exports of the process-table constants
//! the policy and MLFQ code key off of.

pub use crate::process::types::{MLFQ_LEVELS, NPROC, QUANTUM, STARV_CUT};

/// Number of CPUs the per-CPU scheduler loop is modeled for. A teaching
/// kernel rarely needs more to exercise the policies; an embedder wanting
/// more just calls the per-CPU entry points with a larger index space.
pub const NCPU: usize = 8;

/// Scheduling policy. A teaching kernel typically bakes this in as a
/// build-time choice; this crate keeps it as a runtime-settable value
/// instead, defaulting to `RoundRobin`, so a single build can be
/// exercised under all five.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedPolicy {
    RoundRobin,
    Fifo,
    Sjf,
    Stcf,
    Mlfq,
}

impl Default for SchedPolicy {
    fn default() -> Self {
        SchedPolicy::RoundRobin
    }
}

static CURRENT_POLICY: spin::Mutex<SchedPolicy> = spin::Mutex::new(SchedPolicy::RoundRobin);

/// Install the policy used by every CPU's scheduler loop from now on.
pub fn set_policy(policy: SchedPolicy) {
    *CURRENT_POLICY.lock() = policy;
}

/// The policy currently in effect.
pub fn policy() -> SchedPolicy {
    *CURRENT_POLICY.lock()
}
