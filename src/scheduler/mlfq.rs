//! Multi-level feedback queue controller.
//!
//! Three levels, 0 highest. `priority` is the natural level demotion and
//! aging operate on; `queue_level` is the effective level priority
//! inheritance may have temporarily lifted. `scheduler::inherit`
//! keeps `queue_level` in sync with `priority` and the `waiting_for`
//! graph, so every mutation here touches `priority` and then calls
//! `inherit::reorient` rather than writing `queue_level` directly — that
//! keeps a process's inheritance-donated level from being silently
//! clobbered by a demotion or an aging pass.

use crate::klog;
use crate::logger::LogLevel;
use crate::process::table::TABLE;
use crate::process::types::{ProcState, MLFQ_LEVELS, QUANTUM, STARV_CUT};
use crate::scheduler::inherit;

/// Pick the Runnable slot at the highest non-empty level, least recently
/// dispatched within that level. Returns `None` if no slot is Runnable.
pub fn select() -> Option<usize> {
    for level in 0..MLFQ_LEVELS as u8 {
        let mut best: Option<(usize, u64)> = None;
        for (idx, slot) in TABLE.iter().enumerate() {
            let proc = slot.lock();
            if proc.state != ProcState::Runnable || proc.queue_level != level {
                continue;
            }
            match best {
                Some((_, ltime)) if proc.ltime >= ltime => {}
                _ => best = Some((idx, proc.ltime)),
            }
        }
        if let Some((idx, _)) = best {
            return Some(idx);
        }
    }
    None
}

/// Aging pass, run at the top of every MLFQ scheduling attempt: any
/// Runnable process that has gone more than `STARV_CUT` ticks without
/// running is promoted one level toward 0.
pub fn age(now: u64) {
    for (idx, slot) in TABLE.iter().enumerate() {
        let promote = {
            let proc = slot.lock();
            proc.state == ProcState::Runnable
                && proc.queue_level > 0
                && now.saturating_sub(proc.etime) > STARV_CUT
        };
        if promote {
            {
                let mut proc = slot.lock();
                if proc.state == ProcState::Runnable && proc.queue_level > 0 {
                    proc.priority -= 1;
                    proc.etime = now;
                    klog!(
                        LogLevel::Debug,
                        "mlfq::age: slot {} promoted, priority now {}",
                        idx,
                        proc.priority
                    );
                }
            }
            inherit::reorient(idx);
        }
    }
}

/// Bill `elapsed` ticks against `slot`'s current quantum. If the quantum
/// is exhausted and the process isn't already at the lowest level, demote
/// it (bump its natural `priority`, reset the quantum) and re-run priority
/// inheritance since a demotion can only ever make the effective level
/// equal to or worse than before, and any waiter relying on it must be
/// re-donated to.
pub fn account(slot: usize, elapsed: u32) {
    let exhausted = {
        let mut proc = TABLE[slot].lock();
        if elapsed < proc.time_slice {
            proc.time_slice -= elapsed;
            false
        } else {
            proc.time_slice = 0;
            proc.demote = true;
            true
        }
    };

    if !exhausted {
        return;
    }

    {
        let mut proc = TABLE[slot].lock();
        if (proc.priority as usize) < MLFQ_LEVELS - 1 {
            proc.priority += 1;
            klog!(
                LogLevel::Debug,
                "mlfq::account: slot {} demoted to priority {}",
                slot,
                proc.priority
            );
        }
        // Already at the floor: no further demotion, but the quantum is
        // still refilled so the process isn't stuck at time_slice == 0.
        proc.time_slice = QUANTUM[proc.priority as usize];
        proc.demote = false;
    }
    inherit::reorient(slot);
}

/// Reset `slot` to level 0 with a fresh quantum, the state a new process
/// (or one re-forked into the table) enters MLFQ at.
pub fn reset_to_top(slot: usize) {
    let mut proc = TABLE[slot].lock();
    proc.priority = 0;
    proc.queue_level = 0;
    proc.time_slice = QUANTUM[0];
    proc.demote = false;
}
