//! Leveled kernel-style logging.
//!
//! This crate owns no console or serial port, so unlike the kernel it was
//! distilled from, logging here means: filter by level, append a formatted
//! line to a bounded ring buffer (for introspection and tests), and forward
//! to an optional sink the embedder registers. A real kernel would register
//! a sink that writes to its own console; a test harness can register one
//! that collects lines for assertions.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};
use spin::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn priority(self) -> u8 {
        match self {
            LogLevel::Fatal => 0,
            LogLevel::Error => 1,
            LogLevel::Warn => 2,
            LogLevel::Info => 3,
            LogLevel::Debug => 4,
            LogLevel::Trace => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info.priority());

pub fn set_max_level(level: LogLevel) {
    LOG_LEVEL.store(level.priority(), Ordering::Relaxed);
}

const RINGBUF_SIZE: usize = 8192;

struct RingBuffer {
    buf: [u8; RINGBUF_SIZE],
    write_pos: usize,
}

impl RingBuffer {
    const fn new() -> Self {
        Self {
            buf: [0; RINGBUF_SIZE],
            write_pos: 0,
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.buf[self.write_pos] = byte;
            self.write_pos = (self.write_pos + 1) % RINGBUF_SIZE;
        }
    }
}

static RINGBUF: Mutex<RingBuffer> = Mutex::new(RingBuffer::new());

pub type Sink = fn(LogLevel, &str);

static SINK: Mutex<Option<Sink>> = Mutex::new(None);

pub fn set_sink(sink: Sink) {
    *SINK.lock() = Some(sink);
}

pub fn clear_sink() {
    *SINK.lock() = None;
}

const LINE_BUF_SIZE: usize = 256;

struct LineBuffer {
    buf: [u8; LINE_BUF_SIZE],
    len: usize,
}

impl LineBuffer {
    const fn new() -> Self {
        Self {
            buf: [0; LINE_BUF_SIZE],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = LINE_BUF_SIZE - self.len;
        let take = bytes.len().min(remaining);
        self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }
}

pub fn log(level: LogLevel, args: fmt::Arguments<'_>) {
    if level.priority() > LOG_LEVEL.load(Ordering::Relaxed) {
        return;
    }

    let mut line = LineBuffer::new();
    let _ = write!(line, "[{}] ", level.as_str());
    let _ = fmt::write(&mut line, args);
    let _ = line.write_str("\n");

    RINGBUF.lock().write_bytes(line.as_str().as_bytes());

    if let Some(sink) = *SINK.lock() {
        sink(level, line.as_str());
    }
}
