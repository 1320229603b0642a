//! # Reader State
//!
//! Holds the one `TagReader` and the sending half of its event queue.
//!
//! ```text
//!  reader thread                         presentation loop
//!  ─────────────                         ─────────────────
//!  on_event(ev) ──► UnboundedSender ───► UnboundedReceiver ──► Station
//! ```
//!
//! The callback only sends; it never touches station state.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

use rentrack_reader::{LineSource, ReaderConfig, ReaderEvent, ReaderResult, TagReader};

/// Reader status for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderStatus {
    pub running: bool,
    pub port: Option<String>,
}

pub struct ReaderState {
    reader: TagReader,
    events: UnboundedSender<ReaderEvent>,
}

impl ReaderState {
    /// Creates the reader (stopped) and the queue its events arrive on.
    pub fn new(config: ReaderConfig) -> (Self, UnboundedReceiver<ReaderEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let state = ReaderState {
            reader: TagReader::new(config),
            events,
        };
        (state, rx)
    }

    /// Discovers, opens and starts the reader. No-op if running.
    pub fn start(&mut self) -> ReaderResult<()> {
        let events = self.events.clone();
        self.reader.start(move |event| forward(&events, event))
    }

    /// Starts the loop over a given source instead of a serial port.
    pub fn start_with_source<S>(&mut self, name: &str, source: S) -> ReaderResult<()>
    where
        S: LineSource + 'static,
    {
        let events = self.events.clone();
        self.reader
            .start_with_source(name, source, move |event| forward(&events, event))
    }

    pub fn stop(&mut self) {
        self.reader.stop();
    }

    pub fn status(&self) -> ReaderStatus {
        ReaderStatus {
            running: self.reader.is_running(),
            port: self.reader.port_name().map(str::to_string),
        }
    }

    /// Queues an event as if the reader had produced it (manual tag entry).
    pub fn inject(&self, event: ReaderEvent) {
        forward(&self.events, event);
    }
}

fn forward(events: &UnboundedSender<ReaderEvent>, event: ReaderEvent) {
    if events.send(event).is_err() {
        trace!("Reader event dropped, station has shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Emits one line, then reports the device gone.
    struct OneLine(Option<Vec<u8>>);

    impl LineSource for OneLine {
        fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
            match self.0.take() {
                Some(line) => {
                    buf.extend_from_slice(&line);
                    Ok(line.len())
                }
                None => Ok(0),
            }
        }
    }

    #[tokio::test]
    async fn test_events_reach_the_queue() {
        let (mut state, mut rx) = ReaderState::new(ReaderConfig::default());
        assert_eq!(
            state.status(),
            ReaderStatus {
                running: false,
                port: None
            }
        );

        state
            .start_with_source("bench", OneLine(Some(b"hello\n".to_vec())))
            .unwrap();

        // "hello" is skipped, then the closed device is reported
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ReaderEvent::Failed(_)));

        state.stop();
        assert_eq!(state.status().port.as_deref(), Some("bench"));
        assert!(!state.status().running);
    }
}
