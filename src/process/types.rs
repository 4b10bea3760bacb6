//! Process table layout and the constants that drive scheduling decisions.

/// Size of the fixed process table. The original design ties this to a
/// single page of slot storage; 64 is generous for a teaching scheduler and
/// keeps every lookup a cheap bounded scan.
pub const NPROC: usize = 64;

/// MLFQ quantum per level, in scheduler time units, doubled so the
/// underlying 0.5 / 1 / 2 ratio is representable with integers. The ratio
/// between levels (1 : 2 : 4) is what MLFQ's demotion/aging logic cares
/// about; the factor of two is consistent throughout this crate, so the
/// same global tick counter is used for `QUANTUM`, `STARV_CUT`, and every
/// slot's `ctime`/`etime`/`ltime`/`rtime`.
pub const QUANTUM: [u32; 3] = [1, 2, 4];

/// Number of MLFQ levels (0 = highest priority, 2 = lowest).
pub const MLFQ_LEVELS: usize = QUANTUM.len();

/// Ticks a Runnable process can sit without running before it is promoted
/// a level by the aging pass.
pub const STARV_CUT: u64 = 1000;

/// Lifecycle state of a process-table slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcState {
    /// Slot is free.
    Unused,
    /// Slot is allocated but the process has not yet been made runnable
    /// (set up in progress).
    Used,
    /// Blocked on a sleep channel.
    Sleeping,
    /// Eligible to run, waiting for the scheduler to pick it.
    Runnable,
    /// Currently executing on a CPU.
    Running,
    /// Exited; waiting for its parent to reap it with `wait`.
    Zombie,
}

/// A unique sleep/wait channel token. Never dereferenced as an address;
/// two sides of a `sleep`/`wakeup` pair agree on a channel purely by value
/// equality, so any distinguishing `u64` works (a stack address repurposed
/// this way in the original design, a slot index, a pipe's table index).
pub type Channel = u64;

/// Monotonically increasing process identifier, exposed to callers of
/// `syscall` and returned by `getprocinfo`. Distinct from a slot's position
/// in the table: a slot is reused by many processes over the table's
/// lifetime, but an id is never reused.
pub type Id = u64;

/// One process-table slot (spec process-slot fields, plus `name` for
/// `getprocinfo`'s snapshot).
#[derive(Clone, Copy, Debug)]
pub struct Process {
    pub id: Id,
    pub state: ProcState,
    /// Slot index of the parent, or `None` for the root/unparented.
    pub parent: Option<usize>,
    pub kill_requested: bool,
    pub exit_code: i32,
    /// Channel this slot is sleeping on; meaningless unless `state` is
    /// `Sleeping`.
    pub channel: Channel,

    /// Tick the slot was allocated (`fork`/table-init time).
    pub ctime: u64,
    /// Tick the process first became Runnable.
    pub stime: u64,
    /// Tick of the last time this slot was actually dispatched (used for
    /// MLFQ's "smallest `ltime`" tie-break among same-level runnables).
    pub ltime: u64,
    /// Tick the slot entered its current state (used by the aging pass to
    /// measure how long a Runnable process has been waiting).
    pub etime: u64,
    /// Accumulated ticks actually spent Running.
    pub rtime: u64,

    /// SJF/STCF: original estimate of total runtime, in ticks. Zero means
    /// "unset" and triggers the RR fallback (§4.1).
    pub expected_runtime: u64,
    /// STCF: remaining runtime estimate, decremented only on voluntary
    /// yield (§9 Open Question: timer preemption never touches this).
    pub time_left: u64,

    /// MLFQ level, 0 (highest) ..= `MLFQ_LEVELS - 1`.
    pub queue_level: u8,
    /// FIFO/static priority tie-break key when a policy needs one beyond
    /// `(ctime, id)`.
    pub priority: i32,
    /// Ticks remaining in the current MLFQ quantum.
    pub time_slice: u32,
    /// Set when `time_slice` hits zero; consumed by the next demotion pass.
    pub demote: bool,

    /// Priority-inheritance edge: slot index of the process this one is
    /// waiting on (a lock holder), or `None`.
    pub waiting_for: Option<usize>,

    /// `getprocinfo` display name. Plays no role in any scheduling
    /// decision.
    pub name: [u8; 16],
}

impl Process {
    pub const fn empty() -> Self {
        Self {
            id: 0,
            state: ProcState::Unused,
            parent: None,
            kill_requested: false,
            exit_code: 0,
            channel: 0,
            ctime: 0,
            stime: 0,
            ltime: 0,
            etime: 0,
            rtime: 0,
            expected_runtime: 0,
            time_left: 0,
            queue_level: 0,
            priority: 0,
            time_slice: 0,
            demote: false,
            waiting_for: None,
            name: [0; 16],
        }
    }
}

/// Snapshot returned by `getprocinfo`: a read-only copy, never a live
/// reference into the table.
#[derive(Clone, Copy, Debug)]
pub struct ProcInfo {
    pub id: Id,
    pub state: ProcState,
    pub name: [u8; 16],
    pub ctime: u64,
    pub etime: u64,
    pub rtime: u64,
    pub expected_runtime: u64,
    pub time_left: u64,
    pub priority: i32,
    pub queue_level: u8,
    pub time_slice: u32,
}
