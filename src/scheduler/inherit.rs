//! Priority inheritance across the `waiting_for` chain.
//!
//! A blocked pipe reader/writer lifts its effective MLFQ level onto
//! whichever process it is waiting behind, so a low-priority lock/buffer
//! holder gets to run and release what a higher-priority waiter needs.
//! `reorient` re-establishes the invariant
//! `target.queue_level == min(target.priority, min over q of q.queue_level
//! where q.waiting_for == target)` at one node and then walks to the next.

use crate::klog;
use crate::logger::LogLevel;
use crate::process::table::{self, TABLE};
use crate::process::types::{MLFQ_LEVELS, QUANTUM};

/// Re-establish `target`'s effective queue level from its natural priority
/// and the levels of everything currently waiting on it, then propagate to
/// whatever `target` itself waits on.
///
/// This walk is iterative, not recursive, and tolerant of a concurrent
/// reorient walking the same chain in the other direction: the
/// only lock ever held across another lock's acquisition is `target`'s own,
/// and the nested scan in step 3 takes and releases each `q`'s lock before
/// moving on, so there is no lock held across a suspension point. Two
/// racing walks converge to the same `effective` regardless of interleaving
/// because each recomputes from scratch rather than mutating state
/// incrementally.
pub fn reorient(target: usize) {
    let mut current = target;
    let mut steps = 0usize;

    loop {
        if steps >= table::NPROC {
            klog!(
                LogLevel::Error,
                "reorient: walk exceeded table size at slot {}, aborting (possible waiting_for cycle)",
                current
            );
            return;
        }
        steps += 1;

        let next = {
            let mut node = TABLE[current].lock();

            let mut effective = node.priority.clamp(0, MLFQ_LEVELS as i32 - 1) as u8;
            for (idx, slot) in TABLE.iter().enumerate() {
                if idx == current {
                    continue;
                }
                let q = slot.lock();
                if q.waiting_for == Some(current) {
                    effective = effective.min(q.queue_level);
                }
            }

            if effective != node.queue_level {
                klog!(
                    LogLevel::Debug,
                    "reorient: slot {} queue_level {} -> {}",
                    current,
                    node.queue_level,
                    effective
                );
                node.queue_level = effective;
                node.time_slice = QUANTUM[effective as usize];
            }

            node.waiting_for
        };

        match next {
            Some(n) if n != current => current = n,
            _ => return,
        }
    }
}
