//! # Tag Reader
//!
//! The blocking read loop and its owning handle.
//!
//! ## Thread Model
//! ```text
//! ┌──────────────────────────┐            ┌──────────────────────────────┐
//! │  caller (station)        │            │  "rfid-reader" thread        │
//! │                          │   spawn    │                              │
//! │  TagReader::start ───────┼───────────►│  loop while running {        │
//! │   (discovers + opens     │            │    read_line (≤ 1 s timeout) │
//! │    the port first)       │            │    parse_frame               │
//! │                          │  on_event  │    on_event(Detected{..})    │
//! │  ◄───────────────────────┼────────────┤  }                           │
//! │                          │            │                              │
//! │  TagReader::stop ────────┼── flag ───►│  exits after current read,   │
//! │   joins ◄────────────────┼────────────┤  drops the port              │
//! └──────────────────────────┘            └──────────────────────────────┘
//! ```
//!
//! `on_event` runs on the reader thread. It should hand the event off
//! (channel send) rather than do work.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::error::{ReaderError, ReaderResult};
use crate::port::{discover_port, open_port, DEFAULT_BAUD_RATE};
use crate::source::{LineSource, SerialLineSource};
use rentrack_core::{parse_frame, TagId};

/// Lines longer than this without a newline are line noise; drop them.
const MAX_LINE_LEN: usize = 4096;

// =============================================================================
// Configuration & Events
// =============================================================================

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Explicit device path. `None` means discover.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Upper bound on how long `stop` waits for the loop.
    pub read_timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// What the reader thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A well-formed frame was read.
    Detected { tag: TagId, at: Instant },

    /// The loop hit an I/O error and has stopped.
    Failed(ReaderError),
}

// =============================================================================
// TagReader
// =============================================================================

/// Owns the reader thread. At most one loop runs per `TagReader`.
pub struct TagReader {
    config: ReaderConfig,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    port_name: Option<String>,
}

impl TagReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            port_name: None,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Opens the device and starts the read loop.
    ///
    /// Returns `Ok(())` without doing anything if the loop is already
    /// running. Discovery and open failures are returned here, before any
    /// thread exists.
    pub fn start<F>(&mut self, on_event: F) -> ReaderResult<()>
    where
        F: FnMut(ReaderEvent) + Send + 'static,
    {
        if self.is_running() {
            debug!(port = ?self.port_name, "RFID reader already running");
            return Ok(());
        }

        let port_name = discover_port(self.config.port.as_deref())?;
        let port = open_port(&port_name, self.config.baud_rate, self.config.read_timeout)?;

        self.spawn(port_name, SerialLineSource::new(port), on_event)
    }

    /// Starts the loop over an already-open source.
    ///
    /// Same idempotence as [`start`](Self::start).
    pub fn start_with_source<S, F>(
        &mut self,
        name: impl Into<String>,
        source: S,
        on_event: F,
    ) -> ReaderResult<()>
    where
        S: LineSource + 'static,
        F: FnMut(ReaderEvent) + Send + 'static,
    {
        if self.is_running() {
            debug!(port = ?self.port_name, "RFID reader already running");
            return Ok(());
        }

        self.spawn(name.into(), source, on_event)
    }

    fn spawn<S, F>(&mut self, port_name: String, source: S, on_event: F) -> ReaderResult<()>
    where
        S: LineSource + 'static,
        F: FnMut(ReaderEvent) + Send + 'static,
    {
        // A loop that ended on its own still has a handle to reap
        self.join();

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let label = port_name.clone();

        let handle = thread::Builder::new()
            .name("rfid-reader".to_string())
            .spawn(move || run_loop(source, &running, on_event, &label))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                ReaderError::Thread(e.to_string())
            })?;

        info!(port = %port_name, "RFID reader started");
        self.handle = Some(handle);
        self.port_name = Some(port_name);
        Ok(())
    }

    /// Stops the loop and waits for the device to be released.
    ///
    /// Returns within one read timeout. Safe to call when not running.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if self.join() {
            info!(port = ?self.port_name, "RFID reader stopped");
        }
    }

    /// Joins the thread if there is one. Returns whether there was.
    fn join(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                if handle.join().is_err() {
                    warn!(port = ?self.port_name, "RFID reader thread panicked");
                }
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Device the loop was last started on.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }
}

impl Drop for TagReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Read Loop
// =============================================================================

fn run_loop<S, F>(mut source: S, running: &AtomicBool, mut on_event: F, port: &str)
where
    S: LineSource,
    F: FnMut(ReaderEvent),
{
    let mut buf: Vec<u8> = Vec::with_capacity(64);

    while running.load(Ordering::SeqCst) {
        match source.read_line(&mut buf) {
            Ok(0) => {
                error!(port = %port, "RFID reader closed");
                on_event(ReaderEvent::Failed(ReaderError::Device(
                    "device closed".to_string(),
                )));
                break;
            }
            Ok(_) if buf.last() != Some(&b'\n') => {
                // Line continues on the next read
                drop_oversized(&mut buf, port);
            }
            Ok(_) => {
                let line = trim_line_end(&buf);
                if !line.is_empty() {
                    match parse_frame(line) {
                        Some(tag) => {
                            debug!(port = %port, tag = %tag, "Tag read");
                            on_event(ReaderEvent::Detected {
                                tag,
                                at: Instant::now(),
                            });
                        }
                        None => trace!(port = %port, len = line.len(), "Skipping non-tag line"),
                    }
                }
                buf.clear();
            }
            Err(e) if is_idle(&e) => drop_oversized(&mut buf, port),
            Err(e) => {
                error!(port = %port, error = %e, "RFID reader I/O error");
                on_event(ReaderEvent::Failed(ReaderError::Device(e.to_string())));
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
}

fn is_idle(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn drop_oversized(buf: &mut Vec<u8>, port: &str) {
    if buf.len() > MAX_LINE_LEN {
        warn!(port = %port, len = buf.len(), "Discarding unterminated line");
        buf.clear();
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::mpsc;

    const CUTTER_11: &str = "a55a0019833000e200001b260c02562050e0f800";
    const GRINDER_05: &str = "a55a0019833000e200001b6604009417203cbf00";

    /// A reader frame for `tag`: 20 tag bytes, 3 trailer bytes, CR LF.
    fn frame(tag: &str) -> Vec<u8> {
        let hex = format!("{tag}c001840d0a");
        (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
            .collect()
    }

    enum Step {
        Bytes(Vec<u8>),
        Idle,
        Fail(io::ErrorKind),
        Closed,
    }

    /// Plays back `steps`, then idles until stopped.
    struct Scripted {
        steps: VecDeque<Step>,
        released: Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(steps: Vec<Step>) -> (Self, Arc<AtomicBool>) {
            let released = Arc::new(AtomicBool::new(false));
            let source = Self {
                steps: steps.into(),
                released: Arc::clone(&released),
            };
            (source, released)
        }
    }

    impl LineSource for Scripted {
        fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
            match self.steps.pop_front() {
                Some(Step::Bytes(bytes)) => {
                    buf.extend_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
                Some(Step::Closed) => Ok(0),
                Some(Step::Idle) | None => {
                    thread::sleep(Duration::from_millis(20));
                    Err(io::Error::new(io::ErrorKind::TimedOut, "no data"))
                }
            }
        }
    }

    impl Drop for Scripted {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn start(steps: Vec<Step>) -> (TagReader, mpsc::Receiver<ReaderEvent>, Arc<AtomicBool>) {
        let (source, released) = Scripted::new(steps);
        let (tx, rx) = mpsc::channel();
        let mut reader = TagReader::new(ReaderConfig::default());
        reader
            .start_with_source("scripted", source, move |event| {
                let _ = tx.send(event);
            })
            .unwrap();
        (reader, rx, released)
    }

    fn next(rx: &mpsc::Receiver<ReaderEvent>) -> ReaderEvent {
        rx.recv_timeout(Duration::from_secs(2)).unwrap()
    }

    fn detected_tag(event: ReaderEvent) -> String {
        match event {
            ReaderEvent::Detected { tag, .. } => tag.into_inner(),
            other => panic!("expected detection, got {other:?}"),
        }
    }

    #[test]
    fn test_detections_arrive_in_read_order() {
        let (mut reader, rx, _) = start(vec![
            Step::Bytes(frame(CUTTER_11)),
            Step::Bytes(frame(GRINDER_05)),
            Step::Bytes(frame(CUTTER_11)),
        ]);

        assert_eq!(detected_tag(next(&rx)), CUTTER_11);
        assert_eq!(detected_tag(next(&rx)), GRINDER_05);
        // The loop never debounces
        assert_eq!(detected_tag(next(&rx)), CUTTER_11);

        reader.stop();
    }

    #[test]
    fn test_non_tag_lines_are_skipped() {
        let (mut reader, rx, _) = start(vec![
            Step::Bytes(b"READER v2.1 ready\r\n".to_vec()),
            Step::Bytes(b"\n".to_vec()),
            Step::Bytes(vec![0xa5, 0x5a, 0x01, b'\n']),
            Step::Bytes(frame(GRINDER_05)),
        ]);

        assert_eq!(detected_tag(next(&rx)), GRINDER_05);
        reader.stop();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_line_split_across_timeouts_is_reassembled() {
        let bytes = frame(CUTTER_11);
        let (head, tail) = bytes.split_at(9);

        let (mut reader, rx, _) = start(vec![
            Step::Bytes(head.to_vec()),
            Step::Idle,
            Step::Idle,
            Step::Bytes(tail.to_vec()),
        ]);

        assert_eq!(detected_tag(next(&rx)), CUTTER_11);
        reader.stop();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_io_error_reports_failure_and_ends_loop() {
        let (mut reader, rx, released) = start(vec![
            Step::Bytes(frame(CUTTER_11)),
            Step::Fail(io::ErrorKind::BrokenPipe),
            Step::Bytes(frame(GRINDER_05)),
        ]);

        assert_eq!(detected_tag(next(&rx)), CUTTER_11);
        assert!(matches!(next(&rx), ReaderEvent::Failed(ReaderError::Device(_))));

        // Nothing after the failure is read
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!reader.is_running());

        reader.stop();
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_closed_device_is_a_failure() {
        let (mut reader, rx, _) = start(vec![Step::Closed]);

        match next(&rx) {
            ReaderEvent::Failed(ReaderError::Device(message)) => {
                assert_eq!(message, "device closed")
            }
            other => panic!("unexpected event {other:?}"),
        }
        reader.stop();
    }

    #[test]
    fn test_stop_releases_device_within_read_timeout() {
        let (mut reader, _rx, released) = start(vec![]);
        assert!(reader.is_running());
        assert_eq!(reader.port_name(), Some("scripted"));

        let begin = Instant::now();
        reader.stop();

        assert!(begin.elapsed() < ReaderConfig::default().read_timeout);
        assert!(released.load(Ordering::SeqCst));
        assert!(!reader.is_running());

        // Stopping twice is harmless
        reader.stop();
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let (mut reader, rx, first_released) = start(vec![]);

        let (second, second_released) = Scripted::new(vec![Step::Bytes(frame(GRINDER_05))]);
        reader
            .start_with_source("second", second, |_| panic!("second loop must not run"))
            .unwrap();

        assert_eq!(reader.port_name(), Some("scripted"));
        // The unused source is dropped immediately; the first one is still held
        assert!(second_released.load(Ordering::SeqCst));
        assert!(!first_released.load(Ordering::SeqCst));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        reader.stop();
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut reader, _rx, _) = start(vec![]);
        reader.stop();

        let (source, _) = Scripted::new(vec![Step::Bytes(frame(GRINDER_05))]);
        let (tx, rx) = mpsc::channel();
        reader
            .start_with_source("again", source, move |e| {
                let _ = tx.send(e);
            })
            .unwrap();

        assert_eq!(detected_tag(next(&rx)), GRINDER_05);
        assert_eq!(reader.port_name(), Some("again"));
    }

    #[test]
    fn test_drop_stops_thread() {
        let (reader, _rx, released) = start(vec![]);
        drop(reader);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_trim_line_end() {
        assert_eq!(trim_line_end(b"ab\r\n"), b"ab");
        assert_eq!(trim_line_end(b"ab\n"), b"ab");
        assert_eq!(trim_line_end(b"\n"), b"");
    }
}
