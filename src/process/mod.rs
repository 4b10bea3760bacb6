//! Process table subsystem: slot layout and constants
//! (`types`), the table/locks/clock (`table`), and lifecycle operations —
//! fork, exit, wait, kill, the SJF/STCF hint setters, `getprocinfo`
//! (`lifecycle`).

pub mod lifecycle;
pub mod table;
pub mod types;

pub use types::{Channel, Id, ProcInfo, ProcState, Process, MLFQ_LEVELS, NPROC, QUANTUM, STARV_CUT};
