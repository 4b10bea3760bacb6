//! Policy picker: one pure selection function per policy, plus
//! the dispatch mechanics shared by all of them. Must be invoked with
//! interrupts disabled on the calling CPU; `scheduler::percpu` is the only
//! caller that matters for that precondition in practice.

use crate::klog;
use crate::logger::LogLevel;
use crate::process::table::{self, TABLE};
use crate::process::types::ProcState;
use crate::scheduler::types::SchedPolicy;
use crate::scheduler::{mlfq, percpu};

/// Candidate key used by the tie-break rule common to every non-MLFQ
/// policy: `(key, ctime, id)` ascending, chosen to make tie-breaks
/// deterministic and easy to test.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    key: u64,
    ctime: u64,
    id: u64,
    slot: usize,
}

/// +∞ sentinel for SJF/STCF candidates with no hint.
const NO_HINT: u64 = u64::MAX;

fn runnable_candidates(key_of: impl Fn(&crate::process::types::Process) -> u64) -> heapless_candidates::Candidates {
    let mut out = heapless_candidates::Candidates::new();
    for (idx, slot) in TABLE.iter().enumerate() {
        let proc = slot.lock();
        if proc.state != ProcState::Runnable {
            continue;
        }
        out.push(Candidate {
            key: key_of(&proc),
            ctime: proc.ctime,
            id: proc.id,
            slot: idx,
        });
    }
    out
}

/// A tiny fixed-capacity vector so the picker never needs an allocator;
/// `NPROC` candidates is the worst case.
mod heapless_candidates {
    use super::Candidate;
    use crate::process::types::NPROC;

    pub struct Candidates {
        items: [Option<Candidate>; NPROC],
        len: usize,
    }

    impl Candidates {
        pub fn new() -> Self {
            Self {
                items: [None; NPROC],
                len: 0,
            }
        }

        pub fn push(&mut self, c: Candidate) {
            self.items[self.len] = Some(c);
            self.len += 1;
        }

        pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
            self.items[..self.len].iter().filter_map(|c| c.as_ref())
        }

        pub fn is_empty(&self) -> bool {
            self.len == 0
        }

        pub fn all_unhinted(&self) -> bool {
            self.iter().all(|c| c.key == super::NO_HINT)
        }
    }
}

fn smallest(candidates: &heapless_candidates::Candidates) -> Option<usize> {
    let mut best: Option<Candidate> = None;
    for c in candidates.iter() {
        best = match best {
            None => Some(*c),
            Some(b) if (c.key, c.ctime, c.id) < (b.key, b.ctime, b.id) => Some(*c),
            Some(b) => Some(b),
        };
    }
    best.map(|c| c.slot)
}

/// Attempt to dispatch `slot` on `cpu`: take its lock, recheck it is still
/// Runnable (another CPU may have raced us to it; racing dispatchers
/// resolve by each taking the candidate's slot lock and rechecking), and
/// if so commit the context switch.
fn try_dispatch(cpu: usize, slot: usize) -> bool {
    let now = table::now();
    let committed = {
        let mut proc = TABLE[slot].lock();
        if proc.state != ProcState::Runnable {
            false
        } else {
            proc.state = ProcState::Running;
            proc.ltime = now;
            if proc.stime == 0 {
                proc.stime = now;
            }
            true
        }
    };
    if committed {
        percpu::set_current(cpu, slot);
        klog!(LogLevel::Debug, "dispatch: cpu {} -> slot {}", cpu, slot);
        crate::dispatch::unpark(slot);
    }
    committed
}

/// Round-robin: every Runnable process gets one turn per
/// scheduling round, in table order.
pub fn pick_rr(cpu: usize) -> bool {
    for (idx, slot) in TABLE.iter().enumerate() {
        let runnable = slot.lock().state == ProcState::Runnable;
        if runnable && try_dispatch(cpu, idx) {
            return true;
        }
    }
    false
}

/// First-come-first-served: least `ctime`, ties by `id` (which agrees with
/// slot allocation order in this crate, since ids are assigned in slot
/// scan order at alloc time).
pub fn pick_fifo(cpu: usize) -> bool {
    let candidates = runnable_candidates(|p| p.ctime);
    // FIFO's key *is* ctime; reuse the generic smallest-tuple helper with
    // key == ctime so the (ctime, ctime, id) ordering degenerates to plain
    // (ctime, id).
    match smallest(&candidates) {
        Some(slot) => try_dispatch(cpu, slot),
        None => false,
    }
}

/// Shortest-job-first: key = `expected_runtime` (0 ⇒ sentinel). Falls back
/// to round-robin for the round if every candidate is unhinted.
pub fn pick_sjf(cpu: usize) -> bool {
    let candidates = runnable_candidates(|p| {
        if p.expected_runtime == 0 {
            NO_HINT
        } else {
            p.expected_runtime
        }
    });
    if candidates.is_empty() {
        return false;
    }
    if candidates.all_unhinted() {
        return pick_rr(cpu);
    }
    match smallest(&candidates) {
        Some(slot) => try_dispatch(cpu, slot),
        None => false,
    }
}

/// Shortest-time-to-completion-first: key = `time_left`, otherwise
/// identical to SJF.
pub fn pick_stcf(cpu: usize) -> bool {
    let candidates = runnable_candidates(|p| {
        if p.expected_runtime == 0 {
            NO_HINT
        } else {
            p.time_left
        }
    });
    if candidates.is_empty() {
        return false;
    }
    if candidates.all_unhinted() {
        return pick_rr(cpu);
    }
    match smallest(&candidates) {
        Some(slot) => try_dispatch(cpu, slot),
        None => false,
    }
}

/// MLFQ: age starved Runnable processes, then dispatch the
/// least-recently-run Runnable process at the highest non-empty level.
pub fn pick_mlfq(cpu: usize) -> bool {
    mlfq::age(table::now());
    match mlfq::select() {
        Some(slot) => try_dispatch(cpu, slot),
        None => false,
    }
}

/// Dispatch per the currently installed policy. Returns whether a process
/// was dispatched.
pub fn pick(policy: SchedPolicy, cpu: usize) -> bool {
    match policy {
        SchedPolicy::RoundRobin => pick_rr(cpu),
        SchedPolicy::Fifo => pick_fifo(cpu),
        SchedPolicy::Sjf => pick_sjf(cpu),
        SchedPolicy::Stcf => pick_stcf(cpu),
        SchedPolicy::Mlfq => pick_mlfq(cpu),
    }
}
