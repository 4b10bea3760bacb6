//! Per-CPU scheduler loop: each CPU dispatches via the active policy,
//! accumulates runtime on return, and halts when nothing is Runnable. Also
//! home to `yield_`, the only other public suspension point besides
//! `sleep` — every other blocking operation is built on one or the other.
//!
//! This crate has no real register context to swap, so "the process runs"
//! is modeled the same way `sleep`/`wakeup` model blocking: dispatching a
//! slot calls `dispatch::unpark` to let whatever OS thread represents that
//! process proceed, and `yield_` calls `dispatch::park_current` to suspend
//! the calling thread until the scheduler dispatches it again. With no
//! `Dispatcher` registered (the default, and the case for the
//! deterministic ordering tests) both are no-ops: picking a process just
//! flips its state and stamps its clock, and the test itself plays the
//! part of "the process ran for N ticks" by advancing the tick counter
//! and calling `yield_`/`exit` directly.

use crate::dispatch;
use crate::process::table::{self, TABLE};
use crate::process::types::ProcState;
use crate::scheduler::types::{self, NCPU};
use crate::scheduler::{mlfq, policy};

struct Cpu {
    current: Option<usize>,
}

lazy_static::lazy_static! {
    static ref CPUS: [spin::Mutex<Cpu>; NCPU] =
        core::array::from_fn(|_| spin::Mutex::new(Cpu { current: None }));
}

/// The slot currently Running on `cpu`, if any.
pub fn current(cpu: usize) -> Option<usize> {
    CPUS[cpu].lock().current
}

pub(crate) fn set_current(cpu: usize, slot: usize) {
    CPUS[cpu].lock().current = Some(slot);
}

/// Clear every CPU's `current` pointer that refers to `slot`. Used when a
/// process leaves Running (yield, sleep, exit) without the crate having to
/// thread a CPU id through every call site that can cause that transition.
fn clear_wherever_current(slot: usize) {
    for cpu in CPUS.iter() {
        let mut cpu = cpu.lock();
        if cpu.current == Some(slot) {
            cpu.current = None;
        }
    }
}

/// One scheduling attempt on `cpu`: dispatch per the installed policy.
/// Returns whether a process was dispatched. The caller (an embedder's
/// trap/idle loop, or a test driving ticks by hand) is expected to call
/// this in a loop, halting the CPU between attempts that dispatch nothing.
pub fn run_once(cpu: usize) -> bool {
    policy::pick(types::policy(), cpu)
}

/// Run `run_once` forever, never returning. Not used by the test suite
/// (which drives `run_once` directly to keep scheduling deterministic);
/// provided for an embedder's actual per-CPU idle thread.
pub fn run(cpu: usize) -> ! {
    loop {
        if !run_once(cpu) {
            dispatch::idle_wait(cpu);
        }
    }
}

/// Voluntary yield: the caller holds no locks of its own. Bills
/// elapsed time against the current quantum (MLFQ only), decrements
/// `time_left` if STCF has set one, returns the slot to Runnable, and
/// suspends the calling thread of control until the scheduler dispatches
/// it again.
pub fn yield_(slot: usize) {
    let now = table::now();

    let elapsed = {
        let mut proc = TABLE[slot].lock();
        let elapsed = now.saturating_sub(proc.ltime).min(u32::MAX as u64) as u32;
        proc.etime = now;
        proc.rtime += now.saturating_sub(proc.ltime);
        proc.state = ProcState::Runnable;
        if proc.time_left > 0 {
            proc.time_left -= 1;
        }
        elapsed
    };

    if types::policy() == types::SchedPolicy::Mlfq {
        mlfq::account(slot, elapsed);
    }

    clear_wherever_current(slot);
    dispatch::park_current(slot);
}
