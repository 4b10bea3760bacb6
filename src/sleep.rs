//! Sleep/wakeup: the low-level blocking primitive everything else —
//! `wait`, pipes, `pause` — is built on.
//!
//! The no-lost-wakeup guarantee rests on one rule: a process transitions
//! to `Sleeping` and records its channel while still holding its own slot
//! lock, and releases whatever lock protects the condition it's waiting on
//! (the "interlock", e.g. `WAIT_LOCK` or a pipe's lock) only *after* that
//! transition is visible. Any `wakeup` racing to deliver a wake must first
//! acquire the same slot lock, so it either arrives before the sleeper
//! marks itself `Sleeping` (and the sleeper, having already re-checked its
//! condition under the interlock, never calls `sleep` at all) or after
//! (and finds `Sleeping` with a matching channel, and wakes it). There is
//! no window where a wake can be sent to a channel nobody is listening on
//! yet.
//!
//! Unlike the design this is drawn from, no slot lock is held across the
//! actual block: holding a lock across a real thread park would deadlock
//! any waker that needs the same lock. `dispatch::park_current` is called
//! with all locks released; the `Dispatcher` is responsible for not
//! losing an `unpark` that arrives first (see `dispatch`).

use spin::MutexGuard;

use crate::dispatch;
use crate::process::table::{self, TABLE};
use crate::process::types::{Channel, ProcState};

/// Block the calling slot on `channel`, releasing `interlock` once the
/// slot is marked `Sleeping`. The caller must have already re-checked its
/// wait condition while holding `interlock` (the classic "recheck under
/// the lock, then sleep" pattern) to avoid sleeping on an already-true
/// condition.
pub fn sleep<T>(slot: usize, channel: Channel, interlock: MutexGuard<'_, T>) {
    let mut proc = TABLE[slot].lock();
    proc.state = ProcState::Sleeping;
    proc.channel = channel;
    proc.etime = table::now();
    drop(interlock);
    drop(proc);

    dispatch::park_current(slot);
}

/// Wake every slot sleeping on `channel`.
pub fn wakeup(channel: Channel) {
    for (idx, slot) in TABLE.iter().enumerate() {
        let mut proc = slot.lock();
        if proc.state == ProcState::Sleeping && proc.channel == channel {
            proc.state = ProcState::Runnable;
            proc.etime = table::now();
            drop(proc);
            dispatch::unpark(idx);
        }
    }
}

/// Request cancellation of `slot`. Sets `kill_requested` so the next
/// cooperative check (a syscall return, a sleep-loop recheck) observes it;
/// if the slot is currently `Sleeping`, it is force-woken so it gets a
/// chance to observe the flag instead of blocking indefinitely.
pub fn kill(slot: usize) {
    let mut proc = TABLE[slot].lock();
    proc.kill_requested = true;
    if proc.state == ProcState::Sleeping {
        proc.state = ProcState::Runnable;
        proc.etime = table::now();
        drop(proc);
        dispatch::unpark(slot);
    }
}
