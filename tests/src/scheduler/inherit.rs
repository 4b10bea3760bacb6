//! `reorient` in isolation: set up a `waiting_for` chain by hand and check
//! the donated level propagates (and un-propagates) correctly, without
//! going through a pipe.

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use nexa_sched::process::lifecycle;
    use nexa_sched::process::table;
    use nexa_sched::scheduler::{self, SchedPolicy};

    use crate::harness;

    fn set_natural_level(slot: usize, level: u8) {
        table::with_slot(slot, |p| {
            p.priority = level as i32;
            p.queue_level = level;
            p.waiting_for = None;
        });
    }

    #[test]
    #[serial]
    fn donated_level_propagates_along_the_chain() {
        scheduler::set_policy(SchedPolicy::Mlfq);
        let root = harness::alloc_root();

        let a = table::find_slot_by_id(lifecycle::fork(root).unwrap()).unwrap();
        let b = table::find_slot_by_id(lifecycle::fork(root).unwrap()).unwrap();
        let c = table::find_slot_by_id(lifecycle::fork(root).unwrap()).unwrap();

        set_natural_level(a, 2);
        set_natural_level(b, 2);
        set_natural_level(c, 0);

        table::with_slot(b, |p| p.waiting_for = Some(a));
        table::with_slot(c, |p| p.waiting_for = Some(b));

        scheduler::reorient(c);

        table::with_slot(c, |p| assert_eq!(p.queue_level, 0));
        table::with_slot(b, |p| assert_eq!(p.queue_level, 0));
        table::with_slot(a, |p| assert_eq!(p.queue_level, 0));

        // Once c stops waiting, re-running from b must drop the donation
        // back down to each node's own natural level.
        table::with_slot(c, |p| p.waiting_for = None);
        scheduler::reorient(b);

        table::with_slot(b, |p| assert_eq!(p.queue_level, 2));
        table::with_slot(a, |p| assert_eq!(p.queue_level, 2));

        for slot in [a, b, c] {
            table::with_slot(slot, |p| p.state = nexa_sched::process::types::ProcState::Zombie);
            lifecycle::wait(root).unwrap();
        }
    }

    #[test]
    #[serial]
    fn unrelated_processes_are_unaffected() {
        scheduler::set_policy(SchedPolicy::Mlfq);
        let root = harness::alloc_root();

        let a = table::find_slot_by_id(lifecycle::fork(root).unwrap()).unwrap();
        let bystander = table::find_slot_by_id(lifecycle::fork(root).unwrap()).unwrap();

        set_natural_level(a, 2);
        set_natural_level(bystander, 1);

        scheduler::reorient(a);

        table::with_slot(bystander, |p| assert_eq!(p.queue_level, 1));
        table::with_slot(a, |p| assert_eq!(p.queue_level, 2));

        for slot in [a, bystander] {
            table::with_slot(slot, |p| p.state = nexa_sched::process::types::ProcState::Zombie);
            lifecycle::wait(root).unwrap();
        }
    }
}
