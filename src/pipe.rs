//! Bounded byte pipe with priority-inheritance hooks.
//!
//! A 512-byte ring per pipe, guarded by its own spin-lock; blocking on
//! full/empty is built on `sleep`/`wakeup`, and every block/unblock also
//! threads the blocker's `waiting_for` edge through `scheduler::inherit`
//! so a low-level holder of the other end gets lifted to the waiter's
//! level for as long as the wait lasts — transitively donating scheduling
//! priority from a blocked consumer to the process that holds the
//! resource it waits on.

use crate::error::{SchedError, SchedResult};
use crate::klog;
use crate::logger::LogLevel;
use crate::process::table;
use crate::process::types::Channel;
use crate::scheduler::inherit;
use crate::sleep;

/// Ring capacity: a fixed 512-byte circular buffer per pipe.
pub const PIPE_BUF: usize = 512;

/// Number of pipes this crate can have open concurrently. File descriptors
/// are out of scope for this crate, so pipes are addressed directly by
/// table index, sized the same order of magnitude as the process table.
pub const MAX_PIPES: usize = 16;

pub type PipeId = usize;

struct PipeInner {
    buf: [u8; PIPE_BUF],
    /// Monotonic; index into `buf` is always `n % PIPE_BUF`.
    nread: u64,
    nwrite: u64,
    read_open: bool,
    write_open: bool,
    /// Non-owning slot index of the most recent reader/writer, for PI
    /// targeting.
    last_reader: Option<usize>,
    last_writer: Option<usize>,
    in_use: bool,
}

impl PipeInner {
    const fn empty() -> Self {
        Self {
            buf: [0; PIPE_BUF],
            nread: 0,
            nwrite: 0,
            read_open: false,
            write_open: false,
            last_reader: None,
            last_writer: None,
            in_use: false,
        }
    }

    fn is_full(&self) -> bool {
        self.nwrite - self.nread == PIPE_BUF as u64
    }
}

lazy_static::lazy_static! {
    static ref PIPES: [spin::Mutex<PipeInner>; MAX_PIPES] =
        core::array::from_fn(|_| spin::Mutex::new(PipeInner::empty()));
}

/// Channel a reader blocks on waiting for bytes.
fn read_channel(pipe: PipeId) -> Channel {
    (pipe as u64) << 1
}

/// Channel a writer blocks on waiting for space.
fn write_channel(pipe: PipeId) -> Channel {
    ((pipe as u64) << 1) | 1
}

fn kill_requested(slot: usize) -> bool {
    table::with_slot(slot, |p| p.kill_requested)
}

/// Open a new pipe with both ends open. Returns `TableFull` if every pipe
/// slot is in use.
pub fn open() -> SchedResult<PipeId> {
    for (idx, slot) in PIPES.iter().enumerate() {
        let mut pipe = slot.lock();
        if !pipe.in_use {
            *pipe = PipeInner::empty();
            pipe.in_use = true;
            pipe.read_open = true;
            pipe.write_open = true;
            klog!(LogLevel::Debug, "pipe::open: allocated pipe {}", idx);
            return Ok(idx);
        }
    }
    Err(SchedError::TableFull)
}

/// Write up to `data.len()` bytes from `caller` into `pipe`, blocking
/// while the buffer is full and the read end is still open.
///
/// Returns the number of bytes actually written. A broken pipe or
/// cancellation after some bytes were already transferred returns the
/// partial count, not an error.
pub fn write(pipe: PipeId, caller: usize, data: &[u8]) -> SchedResult<usize> {
    let mut guard = PIPES[pipe].lock();
    guard.last_writer = Some(caller);

    let mut written = 0usize;
    while written < data.len() {
        if !guard.read_open {
            drop(guard);
            return if written > 0 {
                Ok(written)
            } else {
                Err(SchedError::BrokenPipe)
            };
        }
        if kill_requested(caller) {
            drop(guard);
            return if written > 0 {
                Ok(written)
            } else {
                Err(SchedError::Cancelled)
            };
        }

        if guard.is_full() {
            sleep::wakeup(read_channel(pipe));
            let holder = guard.last_reader;
            if let Some(reader) = holder {
                table::with_slot(caller, |p| p.waiting_for = Some(reader));
                inherit::reorient(reader);
            }
            sleep::sleep(caller, write_channel(pipe), guard);
            table::with_slot(caller, |p| p.waiting_for = None);
            if let Some(reader) = holder {
                inherit::reorient(reader);
            }
            guard = PIPES[pipe].lock();
            continue;
        }

        let idx = (guard.nwrite % PIPE_BUF as u64) as usize;
        guard.buf[idx] = data[written];
        guard.nwrite += 1;
        written += 1;
    }

    sleep::wakeup(read_channel(pipe));
    Ok(written)
}

/// Read up to `buf.len()` bytes from `pipe` into `buf`, blocking while the
/// pipe is empty and the write end is still open. Returns `0` on EOF
/// (write end closed with nothing left to read), matching the common
/// read() convention; this crate has no user-address-space copyout to
/// fail mid-read the way a design with real user address spaces might: this
/// crate has no virtual memory to speak of.
pub fn read(pipe: PipeId, caller: usize, buf: &mut [u8]) -> SchedResult<usize> {
    let mut guard = PIPES[pipe].lock();
    guard.last_reader = Some(caller);

    while guard.nread == guard.nwrite && guard.write_open {
        if kill_requested(caller) {
            drop(guard);
            return Err(SchedError::Cancelled);
        }

        let holder = guard.last_writer;
        if let Some(writer) = holder {
            table::with_slot(caller, |p| p.waiting_for = Some(writer));
            inherit::reorient(writer);
        }
        sleep::sleep(caller, read_channel(pipe), guard);
        table::with_slot(caller, |p| p.waiting_for = None);
        if let Some(writer) = holder {
            inherit::reorient(writer);
        }
        guard = PIPES[pipe].lock();
    }

    let mut n = 0usize;
    while n < buf.len() && guard.nread != guard.nwrite {
        let idx = (guard.nread % PIPE_BUF as u64) as usize;
        buf[n] = guard.buf[idx];
        guard.nread += 1;
        n += 1;
    }

    sleep::wakeup(write_channel(pipe));
    Ok(n)
}

/// Close `pipe`'s read or write end as seen from `caller`. Frees the pipe
/// slot once both ends are closed.
pub fn close(pipe: PipeId, writable: bool) {
    let mut guard = PIPES[pipe].lock();
    if writable {
        guard.write_open = false;
        guard.last_writer = None;
        sleep::wakeup(read_channel(pipe));
    } else {
        guard.read_open = false;
        guard.last_reader = None;
        sleep::wakeup(write_channel(pipe));
    }

    if !guard.read_open && !guard.write_open {
        guard.in_use = false;
        klog!(LogLevel::Debug, "pipe::close: freed pipe {}", pipe);
    }
}
