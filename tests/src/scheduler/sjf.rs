//! Shortest-job-first ordering: smallest `expected_runtime` dispatched
//! first; falls back to round robin when nobody has set a hint.

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use nexa_sched::process::lifecycle;
    use nexa_sched::process::table;
    use nexa_sched::scheduler::{self, policy, SchedPolicy};

    use crate::harness;

    #[test]
    #[serial]
    fn dispatches_shortest_estimate_first() {
        scheduler::set_policy(SchedPolicy::Sjf);
        let root = harness::alloc_root();

        let long = lifecycle::fork(root).unwrap();
        lifecycle::setexpected(table::find_slot_by_id(long).unwrap(), 30);
        let short = lifecycle::fork(root).unwrap();
        lifecycle::setexpected(table::find_slot_by_id(short).unwrap(), 5);
        let medium = lifecycle::fork(root).unwrap();
        lifecycle::setexpected(table::find_slot_by_id(medium).unwrap(), 15);

        let mut order = Vec::new();
        for _ in 0..3 {
            assert!(policy::pick_sjf(0));
            let slot = scheduler::current(0).unwrap();
            order.push(table::slot_id(slot).unwrap());
            lifecycle::exit(slot, 0);
            lifecycle::wait(root).unwrap();
        }

        assert_eq!(order, vec![short, medium, long]);
    }

    #[test]
    #[serial]
    fn ties_break_on_ctime_then_id() {
        scheduler::set_policy(SchedPolicy::Sjf);
        let root = harness::alloc_root();

        let first = lifecycle::fork(root).unwrap();
        lifecycle::setexpected(table::find_slot_by_id(first).unwrap(), 10);
        let second = lifecycle::fork(root).unwrap();
        lifecycle::setexpected(table::find_slot_by_id(second).unwrap(), 10);

        assert!(policy::pick_sjf(0));
        let slot = scheduler::current(0).unwrap();
        assert_eq!(table::slot_id(slot).unwrap(), first);
        lifecycle::exit(slot, 0);
        lifecycle::wait(root).unwrap();

        assert!(policy::pick_sjf(0));
        let slot = scheduler::current(0).unwrap();
        assert_eq!(table::slot_id(slot).unwrap(), second);
        lifecycle::exit(slot, 0);
        lifecycle::wait(root).unwrap();
    }

    #[test]
    #[serial]
    fn falls_back_to_round_robin_when_nobody_has_a_hint() {
        scheduler::set_policy(SchedPolicy::Sjf);
        let root = harness::alloc_root();

        let first = lifecycle::fork(root).unwrap();
        let second = lifecycle::fork(root).unwrap();

        assert!(policy::pick_sjf(0));
        let slot = scheduler::current(0).unwrap();
        assert_eq!(table::slot_id(slot).unwrap(), first);

        lifecycle::exit(slot, 0);
        lifecycle::wait(root).unwrap();
        let slot = table::find_slot_by_id(second).unwrap();
        lifecycle::exit(slot, 0);
        lifecycle::wait(root).unwrap();
    }
}
