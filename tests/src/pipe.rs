//! Pipe semantics: small round trips without blocking, EOF and
//! broken-pipe behavior, and the blocking paths that need a real second
//! thread to unblock them.

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use serial_test::serial;

    use nexa_sched::pipe::{self, PIPE_BUF};
    use nexa_sched::process::table;
    use nexa_sched::process::types::ProcState;
    use nexa_sched::scheduler::{self, SchedPolicy};

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
    fn write_then_read_round_trips_small_buffers() {
        let root = harness::alloc_root();
        let writer = root;
        let reader = root;
        let pipe_id = pipe::open().unwrap();

        let n = pipe::write(pipe_id, writer, b"hello").unwrap();
        assert_eq!(n, 5);

        let mut buf = [0u8; 8];
        let n = pipe::read(pipe_id, reader, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");

        pipe::close(pipe_id, true);
        pipe::close(pipe_id, false);
    }

    #[test]
    #[serial]
    fn read_returns_zero_at_eof() {
        let root = harness::alloc_root();
        let pipe_id = pipe::open().unwrap();

        pipe::write(pipe_id, root, b"x").unwrap();
        pipe::close(pipe_id, true);

        let mut buf = [0u8; 8];
        let n = pipe::read(pipe_id, root, &mut buf).unwrap();
        assert_eq!(n, 1);

        let n = pipe::read(pipe_id, root, &mut buf).unwrap();
        assert_eq!(n, 0);

        pipe::close(pipe_id, false);
    }

    #[test]
    #[serial]
    fn writing_after_the_read_end_closes_reports_broken_pipe() {
        let root = harness::alloc_root();
        let pipe_id = pipe::open().unwrap();

        pipe::close(pipe_id, false);
        let err = pipe::write(pipe_id, root, b"x").unwrap_err();
        assert_eq!(err, nexa_sched::error::SchedError::BrokenPipe);

        pipe::close(pipe_id, true);
    }

    #[test]
    #[serial]
    fn full_buffer_blocks_the_writer_until_the_reader_drains_it() {
        scheduler::set_policy(SchedPolicy::RoundRobin);
        let _guard = dispatcher::install();
        let root = harness::alloc_root();

        let writer_id = nexa_sched::process::lifecycle::fork(root).unwrap();
        let writer_slot = table::find_slot_by_id(writer_id).unwrap();
        let reader_id = nexa_sched::process::lifecycle::fork(root).unwrap();
        let reader_slot = table::find_slot_by_id(reader_id).unwrap();

        let pipe_id = pipe::open().unwrap();
        let payload = vec![7u8; PIPE_BUF + 10];

        let writer = thread::spawn(move || pipe::write(pipe_id, writer_slot, &payload));

        spin_until(|| table::with_slot(writer_slot, |p| p.state) == ProcState::Sleeping);

        let mut total = 0usize;
        let mut buf = [0u8; 64];
        while total < PIPE_BUF + 10 {
            let n = pipe::read(pipe_id, reader_slot, &mut buf).unwrap();
            total += n;
        }

        let written = writer.join().unwrap().unwrap();
        assert_eq!(written, PIPE_BUF + 10);
        assert_eq!(total, PIPE_BUF + 10);

        pipe::close(pipe_id, true);
        pipe::close(pipe_id, false);
        for slot in [writer_slot, reader_slot] {
            table::with_slot(slot, |p| p.state = ProcState::Zombie);
            nexa_sched::process::lifecycle::wait(root).unwrap();
        }
    }

    #[test]
    #[serial]
    fn a_blocked_reader_donates_its_level_to_the_writer() {
        scheduler::set_policy(SchedPolicy::Mlfq);
        let _guard = dispatcher::install();
        let root = harness::alloc_root();

        let writer_id = nexa_sched::process::lifecycle::fork(root).unwrap();
        let writer_slot = table::find_slot_by_id(writer_id).unwrap();
        table::with_slot(writer_slot, |p| {
            p.priority = 2;
            p.queue_level = 2;
        });

        let reader_id = nexa_sched::process::lifecycle::fork(root).unwrap();
        let reader_slot = table::find_slot_by_id(reader_id).unwrap();
        table::with_slot(reader_slot, |p| {
            p.priority = 0;
            p.queue_level = 0;
        });

        let pipe_id = pipe::open().unwrap();
        // Register writer_slot as the pipe's last writer without
        // transferring any bytes, so the reader's block below has a
        // holder to donate to.
        pipe::write(pipe_id, writer_slot, &[]).unwrap();

        let reader = thread::spawn(move || {
            let mut buf = [0u8; 4];
            pipe::read(pipe_id, reader_slot, &mut buf)
        });

        spin_until(|| table::with_slot(reader_slot, |p| p.state) == ProcState::Sleeping);
        table::with_slot(writer_slot, |p| assert_eq!(p.queue_level, 0));

        pipe::write(pipe_id, writer_slot, b"hi").unwrap();
        let n = reader.join().unwrap().unwrap();
        assert_eq!(n, 2);

        // The donation is released once the reader is no longer waiting.
        table::with_slot(writer_slot, |p| assert_eq!(p.queue_level, 2));

        pipe::close(pipe_id, true);
        pipe::close(pipe_id, false);
        for slot in [writer_slot, reader_slot] {
            table::with_slot(slot, |p| p.state = ProcState::Zombie);
            nexa_sched::process::lifecycle::wait(root).unwrap();
        }
    }
}
