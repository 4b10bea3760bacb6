//! External interfaces: thin wrappers that collapse `SchedResult`/`Option`
//! into the `0`/`-1` return convention, plus `pause`/`uptime`, the
//! tick-channel operations a teaching kernel's `sysproc.c` exposes
//! alongside the core scheduling syscalls.
//!
//! Every function here takes the caller's process-table slot explicitly
//! rather than reading a per-CPU "current process" register, since this
//! crate has no trap frame of its own — an embedder's syscall entry path
//! is expected to resolve "current process" to a slot before calling in
//! here.

use crate::pipe;
use crate::process::lifecycle;
use crate::process::table;
use crate::process::types::{Channel, Id, ProcInfo};
use crate::scheduler::percpu;
use crate::sleep;

/// Channel every `pause` sleeps on; woken once per `timer_tick`. Chosen
/// outside the range `pipe::read_channel`/`write_channel` can ever
/// produce (those are `pipe_id << 1 [| 1]` over `pipe::MAX_PIPES`).
const TICK_CHANNEL: Channel = u64::MAX;

/// Guards the `(ticks, kill_requested)` predicate `pause` rechecks; held
/// only across the recheck-then-sleep pair, matching every other use of
/// `sleep` in this crate.
static TICK_LOCK: spin::Mutex<()> = spin::Mutex::new(());

/// `exit(status)`: terminates `caller`. Never returns to it in the
/// original design (trap return is skipped); this crate's equivalent is
/// simply that `caller`'s slot becomes `Zombie` and the scheduler never
/// dispatches it again.
pub fn exit(caller: usize, status: i32) {
    lifecycle::exit(caller, status);
}

/// `fork()`: clones `parent` into a new Runnable slot at MLFQ level 0.
/// Returns the child's id, or `-1` on table exhaustion.
pub fn fork(parent: usize) -> i64 {
    match lifecycle::fork(parent) {
        Ok(id) => id as i64,
        Err(_) => -1,
    }
}

/// `wait(addr)`: blocks `caller` until one of its children becomes a
/// zombie, reaps it, and returns its id. `addr`'s exit-status copyout is
/// out of scope since this crate has no user address space; callers that
/// need the exit code should use `process::lifecycle::wait` directly.
pub fn wait(caller: usize) -> i64 {
    match lifecycle::wait(caller) {
        Ok((id, _status)) => id as i64,
        Err(_) => -1,
    }
}

/// `kill(id)`: requests cancellation of the process with the given id.
pub fn kill(id: Id) -> i64 {
    match lifecycle::kill(id) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// `pause(n)`: sleeps `caller` on the tick channel until at least `n`
/// ticks have elapsed since the call, or until killed.
pub fn pause(caller: usize, n: u64) -> i64 {
    let ticks0 = table::now();
    loop {
        if table::with_slot(caller, |p| p.kill_requested) {
            return -1;
        }
        if table::now().saturating_sub(ticks0) >= n {
            return 0;
        }
        let guard = TICK_LOCK.lock();
        // Recheck under the lock before sleeping, per the sleep contract.
        if table::with_slot(caller, |p| p.kill_requested) {
            return -1;
        }
        if table::now().saturating_sub(ticks0) >= n {
            return 0;
        }
        sleep::sleep(caller, TICK_CHANNEL, guard);
    }
}

/// `yield()`: voluntary yield.
pub fn yield_(caller: usize) -> i64 {
    percpu::yield_(caller);
    0
}

/// `setexpected(e)`: sets the SJF runtime hint.
pub fn setexpected(caller: usize, e: u64) -> i64 {
    lifecycle::setexpected(caller, e);
    0
}

/// `setstcfvals(e)`: sets the STCF runtime hint and seeds its residual to
/// `e + 1`.
pub fn setstcfvals(caller: usize, e: u64) -> i64 {
    lifecycle::setstcfvals(caller, e);
    0
}

/// `getprocinfo(id, out)`: snapshots scheduling state for `id` into `out`.
pub fn getprocinfo(id: Id, out: &mut ProcInfo) -> i64 {
    match lifecycle::getprocinfo(id) {
        Ok(info) => {
            *out = info;
            0
        }
        Err(_) => -1,
    }
}

/// Opens a new pipe. Returns the pipe id, or `-1` if every pipe slot is in
/// use.
pub fn pipe_open() -> i64 {
    match pipe::open() {
        Ok(id) => id as i64,
        Err(_) => -1,
    }
}

/// Writes `data` to `pipe` on behalf of `caller`. Returns the number of
/// bytes written, or `-1` on a broken pipe / cancellation with zero
/// progress.
pub fn pipe_write(pipe_id: pipe::PipeId, caller: usize, data: &[u8]) -> i64 {
    match pipe::write(pipe_id, caller, data) {
        Ok(n) => n as i64,
        Err(_) => -1,
    }
}

/// Reads into `buf` from `pipe` on behalf of `caller`. Returns the number
/// of bytes read (`0` on EOF), or `-1` on cancellation.
pub fn pipe_read(pipe_id: pipe::PipeId, caller: usize, buf: &mut [u8]) -> i64 {
    match pipe::read(pipe_id, caller, buf) {
        Ok(n) => n as i64,
        Err(_) => -1,
    }
}

/// Closes one end of `pipe`.
pub fn pipe_close(pipe_id: pipe::PipeId, writable: bool) -> i64 {
    pipe::close(pipe_id, writable);
    0
}

/// Advances the global tick counter by one and wakes every `pause`r that
/// might now satisfy its deadline. An embedder's timer-interrupt handler
/// calls this once per tick; it is the one external trigger `pause`
/// depends on to ever recheck its predicate without busy-waiting.
pub fn timer_tick() -> u64 {
    let t = table::tick();
    sleep::wakeup(TICK_CHANNEL);
    t
}

/// `uptime()`-equivalent: the raw tick count `pause` and aging both
/// measure against.
pub fn uptime() -> u64 {
    table::now()
}
