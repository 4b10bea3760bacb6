//! The fixed process table and the locks/clock that guard it.
//!
//! Slot lookups here are a bounded linear scan over `NPROC` slots rather
//! than the fast-path-plus-fallback (radix tree, then scan) idiom used by
//! larger tables in this lineage: without a heap allocator this crate has
//! nowhere to root a radix tree, and at `NPROC = 64` a full scan under the
//! slot lock is cheap enough that a second structure would only add a
//! consistency hazard. The scan-then-act shape of every accessor below
//! still follows that lineage directly.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use super::types::{Id, Process};
use crate::klog;
use crate::logger::LogLevel;

pub const NPROC: usize = super::types::NPROC;

lazy_static::lazy_static! {
    /// One lock per slot. Lock order throughout the crate is
    /// `WAIT_LOCK -> slot lock -> resource lock` (pipe lock, etc); never
    /// acquire two slot locks without going through `wait_lock` first,
    /// except in `reorient`'s deliberately-tolerated ABBA case (see
    /// `scheduler::inherit`).
    pub static ref TABLE: [Mutex<Process>; NPROC] =
        core::array::from_fn(|_| Mutex::new(Process::empty()));
}

/// Serializes parent/child relationship changes (`fork`, `exit`, `wait`,
/// reparenting), exactly as `wait_lock` does in the original design.
pub static WAIT_LOCK: Mutex<()> = Mutex::new(());

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static TICKS: AtomicU64 = AtomicU64::new(0);

/// Advance the global clock by one tick. Called once per timer interrupt
/// by `scheduler::percpu`; every `ctime`/`etime`/`ltime`/`rtime` field and
/// `STARV_CUT` are expressed in these same units.
pub fn tick() -> u64 {
    TICKS.fetch_add(1, Ordering::Relaxed) + 1
}

/// Current tick count, with no side effect.
pub fn now() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

fn next_id() -> Id {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Find an `Unused` slot, mark it `Used`, stamp it with a fresh id and the
/// current tick, and return its index. Returns `None` if the table is
/// full (the caller turns this into `SchedError::TableFull`).
pub fn alloc_slot(parent: Option<usize>) -> Option<usize> {
    for (idx, slot) in TABLE.iter().enumerate() {
        let mut proc = slot.lock();
        if proc.state != super::types::ProcState::Unused {
            continue;
        }

        let id = next_id();
        let t = now();
        *proc = Process::empty();
        proc.id = id;
        proc.state = super::types::ProcState::Used;
        proc.parent = parent;
        proc.ctime = t;
        proc.etime = t;

        klog!(LogLevel::Debug, "alloc_slot: slot {} -> id {}", idx, id);
        return Some(idx);
    }

    klog!(LogLevel::Warn, "alloc_slot: table full");
    None
}

/// Lock `slot` and run `f` against it. Panics (a kernel invariant
/// violation) if `slot` is out of range: callers only ever pass indices
/// obtained from this table.
pub fn with_slot<R>(slot: usize, f: impl FnOnce(&mut Process) -> R) -> R {
    let mut proc = TABLE[slot].lock();
    f(&mut proc)
}

/// Find the slot currently holding `id`. `Unused` slots never match since
/// their `id` is stale from a previous occupant only until `alloc_slot`
/// overwrites it; a freshly-emptied slot's `id` field is irrelevant
/// because its `state` is `Unused`.
pub fn find_slot_by_id(id: Id) -> Option<usize> {
    for (idx, slot) in TABLE.iter().enumerate() {
        let proc = slot.lock();
        if proc.state != super::types::ProcState::Unused && proc.id == id {
            return Some(idx);
        }
    }
    None
}

/// Snapshot an id for a slot, or `None` if the slot is `Unused`.
pub fn slot_id(slot: usize) -> Option<Id> {
    let proc = TABLE[slot].lock();
    if proc.state == super::types::ProcState::Unused {
        None
    } else {
        Some(proc.id)
    }
}
