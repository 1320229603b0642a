//! # rentrack-reader: RFID Reader Loop
//!
//! Reads newline-terminated frames from a serial RFID reader on a
//! dedicated thread and reports each well-formed tag.
//!
//! ```text
//! serial port ──► SerialLineSource ──► run_loop ──► parse_frame ──► on_event
//!                  (LineSource)        (thread)     (core)          (ReaderEvent)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentrack_reader::{ReaderConfig, TagReader};
//!
//! let mut reader = TagReader::new(ReaderConfig::default());
//! reader.start(move |event| { let _ = tx.send(event); })?;
//! // ...
//! reader.stop();
//! ```

pub mod error;
pub mod port;
pub mod reader;
pub mod source;

pub use error::{ReaderError, ReaderResult};
pub use port::{discover_port, list_ports, PortInfo, DEFAULT_BAUD_RATE};
pub use reader::{ReaderConfig, ReaderEvent, TagReader};
pub use source::{LineSource, SerialLineSource};
