//! Recoverable-error taxonomy for the scheduling core.
//!
//! Kernel invariant violations are not represented here: they panic at the
//! point of detection via `kfatal!`, since the system is assumed corrupted
//! once one fires.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedError {
    /// Process table (or pipe table) has no free slot.
    TableFull,
    /// Argument failed validation (negative size, unknown id, ...).
    InvalidArgument,
    /// Caller observed `kill_requested` while blocked and unwound early.
    Cancelled,
    /// Write attempted on a pipe whose read end is closed.
    BrokenPipe,
    /// Lookup by id/channel/slot found nothing.
    NotFound,
}

impl SchedError {
    /// The `-1`-style return value convention used throughout `syscall.rs`.
    pub const fn as_retcode(self) -> i64 {
        -1
    }
}

pub type SchedResult<T> = Result<T, SchedError>;
