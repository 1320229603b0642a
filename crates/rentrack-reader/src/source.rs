//! Line sources the reader loop pulls from.

use serialport::SerialPort;
use std::io::{self, BufRead, BufReader};

/// A blocking, newline-delimited byte source.
///
/// `read_line` appends up to and including the next `\n` to `buf` and
/// returns the number of bytes appended. It must return
/// [`io::ErrorKind::TimedOut`] periodically when no data arrives so the
/// loop can observe a stop request. Bytes appended before a timeout stay in
/// `buf`; the loop keeps them and continues the same line.
/// `Ok(0)` means the source is closed.
pub trait LineSource: Send {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

/// The production source: a buffered serial port.
pub struct SerialLineSource {
    inner: BufReader<Box<dyn SerialPort>>,
}

impl SerialLineSource {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            inner: BufReader::new(port),
        }
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_until(b'\n', buf)
    }
}
