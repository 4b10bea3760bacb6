//! Sleep/wakeup: no-lost-wakeup correctness under real thread races, and
//! `kill` force-waking a sleeper.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use serial_test::serial;

    use nexa_sched::process::table;
    use nexa_sched::process::types::ProcState;
    use nexa_sched::sleep;

    use crate::dispatcher;
    use crate::harness;

    fn spin_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..2000 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("condition never became true");
    }

    #[test]
    #[serial]
    fn wakeup_is_never_lost_across_one_hundred_iterations() {
        let _guard = dispatcher::install();
        let slot = harness::alloc_root();
        let channel = 0xC0FFEEu64;

        for i in 0..100 {
            let ready = Arc::new(spin::Mutex::new(false));
            let ready_in_thread = ready.clone();

            let sleeper = thread::spawn(move || {
                let guard = ready_in_thread.lock();
                if !*guard {
                    sleep::sleep(slot, channel, guard);
                }
            });

            spin_until(|| table::with_slot(slot, |p| p.state) == ProcState::Sleeping);

            {
                let mut guard = ready.lock();
                *guard = true;
            }
            sleep::wakeup(channel);

            sleeper
                .join()
                .unwrap_or_else(|_| panic!("sleeper thread panicked on iteration {}", i));
            table::with_slot(slot, |p| assert_eq!(p.state, ProcState::Runnable));
            table::with_slot(slot, |p| p.state = ProcState::Running);
        }
    }

    #[test]
    #[serial]
    fn kill_force_wakes_a_sleeper() {
        let _guard = dispatcher::install();
        let slot = harness::alloc_root();
        let channel = 0xDEADBEEFu64;

        let lock = Arc::new(spin::Mutex::new(()));
        let lock_in_thread = lock.clone();
        let sleeper = thread::spawn(move || {
            let guard = lock_in_thread.lock();
            sleep::sleep(slot, channel, guard);
        });

        spin_until(|| table::with_slot(slot, |p| p.state) == ProcState::Sleeping);

        sleep::kill(slot);
        sleeper.join().unwrap();

        table::with_slot(slot, |p| {
            assert!(p.kill_requested);
            assert_eq!(p.state, ProcState::Runnable);
        });
    }
}
