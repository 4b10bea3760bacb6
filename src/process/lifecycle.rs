//! Process lifecycle: fork, exit, wait, kill, and the scheduling knobs a
//! caller can set on a slot (`setexpected`, `setstcfvals`) plus the
//! read-only `getprocinfo` snapshot.

use crate::error::{SchedError, SchedResult};
use crate::kinfo;
use crate::process::table::{self, TABLE, WAIT_LOCK};
use crate::process::types::{Channel, Id, Process, ProcInfo, ProcState};
use crate::scheduler::mlfq;
use crate::sleep;

/// Allocate a child slot parented to `parent_slot` and make it Runnable at
/// MLFQ level 0 with a fresh quantum.
pub fn fork(parent_slot: usize) -> SchedResult<Id> {
    let child = table::alloc_slot(Some(parent_slot)).ok_or(SchedError::TableFull)?;

    table::with_slot(child, |p| p.state = ProcState::Runnable);
    mlfq::reset_to_top(child);

    let id = table::slot_id(child).expect("slot just allocated must be occupied");
    kinfo!("fork: slot {} -> id {} (parent slot {})", child, id, parent_slot);
    Ok(id)
}

/// Mark `slot` a zombie, reparent its children to its own parent (orphans
/// with no surviving parent simply stay unparented until reaped by a
/// `kill`-driven cleanup elsewhere, since this crate has no init process
/// to adopt them), and wake a parent blocked in `wait`.
pub fn exit(slot: usize, exit_code: i32) {
    let _guard = WAIT_LOCK.lock();

    let parent = table::with_slot(slot, |p| p.parent);

    for idx in 0..table::NPROC {
        let reparent = {
            let mut child = TABLE[idx].lock();
            if child.parent == Some(slot) && child.state != ProcState::Unused {
                child.parent = parent;
                true
            } else {
                false
            }
        };
        if reparent {
            kinfo!("exit: reparented slot {} from {} to {:?}", idx, slot, parent);
        }
    }

    table::with_slot(slot, |p| {
        p.state = ProcState::Zombie;
        p.exit_code = exit_code;
    });

    if let Some(parent_slot) = parent {
        sleep::wakeup(parent_slot as Channel);
    }
}

/// Block until a child of `parent_slot` exits, reap it, and return its id
/// and exit code. Returns `NotFound` if `parent_slot` has no children at
/// all, `Cancelled` if the caller observes its own `kill_requested` flag
/// while waiting.
pub fn wait(parent_slot: usize) -> SchedResult<(Id, i32)> {
    loop {
        let guard = WAIT_LOCK.lock();

        let mut has_children = false;
        let mut reaped = None;

        for idx in 0..table::NPROC {
            let mut child = TABLE[idx].lock();
            if child.parent != Some(parent_slot) || child.state == ProcState::Unused {
                continue;
            }
            has_children = true;
            if child.state == ProcState::Zombie {
                reaped = Some((child.id, child.exit_code));
                *child = Process::empty();
                break;
            }
        }

        if let Some(result) = reaped {
            return Ok(result);
        }

        if !has_children {
            return Err(SchedError::NotFound);
        }

        if table::with_slot(parent_slot, |p| p.kill_requested) {
            return Err(SchedError::Cancelled);
        }

        sleep::sleep(parent_slot, parent_slot as Channel, guard);
    }
}

/// Request cancellation of the process with the given id.
pub fn kill(id: Id) -> SchedResult<()> {
    let slot = table::find_slot_by_id(id).ok_or(SchedError::NotFound)?;
    sleep::kill(slot);
    Ok(())
}

/// Set the SJF estimate used by the policy picker. Zero restores the
/// "unset" sentinel that falls back to round robin.
pub fn setexpected(slot: usize, expected_runtime: u64) {
    table::with_slot(slot, |p| p.expected_runtime = expected_runtime);
}

/// Set the STCF estimate and its residual. `time_left` starts one tick
/// above `expected_runtime` so a freshly configured process is never
/// mistaken for one that has already run down to completion.
pub fn setstcfvals(slot: usize, expected_runtime: u64) {
    table::with_slot(slot, |p| {
        p.expected_runtime = expected_runtime;
        p.time_left = expected_runtime + 1;
    });
}

/// Snapshot a slot's scheduling-relevant state for `getprocinfo`.
pub fn getprocinfo(id: Id) -> SchedResult<ProcInfo> {
    let slot = table::find_slot_by_id(id).ok_or(SchedError::NotFound)?;
    let info = table::with_slot(slot, |p| ProcInfo {
        id: p.id,
        state: p.state,
        name: p.name,
        ctime: p.ctime,
        etime: p.etime,
        rtime: p.rtime,
        expected_runtime: p.expected_runtime,
        time_left: p.time_left,
        priority: p.priority,
        queue_level: p.queue_level,
        time_slice: p.time_slice,
    });
    Ok(info)
}
