//! Pluggable context-switch hook: the per-CPU current-process pointer and
//! the trap/`swtch` machinery are external collaborators this crate never
//! implements itself.
//!
//! `sched()` (see `scheduler::percpu`) needs to suspend the calling thread
//! of control until something else marks its slot runnable again. On real
//! hardware that "thread of control" is a kernel stack and `swtch` performs
//! the suspension; this crate never does that itself. Instead it calls out
//! to an optional registered [`Dispatcher`]. With nothing registered,
//! `park`/`unpark` are no-ops, which is correct for embedding in a kernel
//! that performs the real switch around calls into this crate. A std test
//! harness registers a `Dispatcher` backed by a condition variable per slot
//! so that blocking primitives (sleep/wakeup, pipe read/write) can be
//! exercised with genuine concurrent OS threads.

pub trait Dispatcher: Sync {
    /// Block the calling thread of control until a matching `unpark`
    /// targets `slot`. Must return immediately, without blocking, if a
    /// matching `unpark` was already delivered (no lost wakeups).
    fn park(&self, slot: usize);

    /// Wake whatever is (or is about to be) parked on `slot`. Must not
    /// lose the signal if it arrives before the corresponding `park`.
    fn unpark(&self, slot: usize);

    /// Put CPU `cpu` into a low-power wait until some interrupt (in this
    /// crate's model: any `unpark`, or just the next polling pass) might
    /// make progress possible again. Default: return
    /// immediately, which is correct when nothing is registered — the
    /// caller's own loop controls pacing.
    fn idle(&self, _cpu: usize) {}
}

static DISPATCHER: spin::Mutex<Option<&'static dyn Dispatcher>> = spin::Mutex::new(None);

pub fn set_dispatcher(dispatcher: &'static dyn Dispatcher) {
    *DISPATCHER.lock() = Some(dispatcher);
}

pub fn clear_dispatcher() {
    *DISPATCHER.lock() = None;
}

pub(crate) fn park_current(slot: usize) {
    let dispatcher = *DISPATCHER.lock();
    if let Some(dispatcher) = dispatcher {
        dispatcher.park(slot);
    }
}

pub(crate) fn unpark(slot: usize) {
    let dispatcher = *DISPATCHER.lock();
    if let Some(dispatcher) = dispatcher {
        dispatcher.unpark(slot);
    }
}

pub(crate) fn idle_wait(cpu: usize) {
    let dispatcher = *DISPATCHER.lock();
    if let Some(dispatcher) = dispatcher {
        dispatcher.idle(cpu);
    }
}
