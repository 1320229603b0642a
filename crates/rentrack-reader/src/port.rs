//! # Serial Port Discovery
//!
//! Finds and opens the RFID reader's serial device.
//!
//! ## Discovery Heuristic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reader.port set?  ── yes ──►  open that path                           │
//! │        │                                                                │
//! │        no                                                               │
//! │        ▼                                                                │
//! │  serialport::available_ports()                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Unix:    name contains "usbserial" or "tty"                            │
//! │  Windows: name contains "COM"                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  rank: usbserial ► ttyUSB/ttyACM ► other tty, then by name              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  first candidate, or ReaderError::DeviceNotFound                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Matches are ranked rather than taken in enumeration order, which differs
//! between platforms and across replugs. With a single matching port the
//! result is the same as taking the first match.

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType, StopBits};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ReaderError, ReaderResult};

/// Baud rate of the reader hardware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// USB product string, when the OS reports one
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let product = match info.port_type {
            SerialPortType::UsbPort(usb) => usb.product,
            _ => None,
        };

        Self {
            name: info.port_name,
            product,
        }
    }
}

/// Lists serial ports the OS knows about. Enumeration failure is an empty list.
pub fn list_ports() -> Vec<PortInfo> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(PortInfo::from).collect(),
        Err(e) => {
            debug!(error = %e, "Serial port enumeration failed");
            Vec::new()
        }
    }
}

// =============================================================================
// Heuristic
// =============================================================================

/// Ranks a port name as a reader candidate, lower is better.
/// `None` means the name does not look like a reader at all.
fn candidate_rank(name: &str, windows: bool) -> Option<u8> {
    if windows {
        return name.to_ascii_uppercase().contains("COM").then_some(0);
    }

    let basename = name.rsplit('/').next().unwrap_or(name);
    if name.contains("usbserial") {
        Some(0)
    } else if basename.contains("ttyUSB") || basename.contains("ttyACM") {
        Some(1)
    } else if name.contains("tty") {
        Some(2)
    } else {
        None
    }
}

/// Picks the best reader candidate out of `names`.
pub fn select_port<'a, I>(names: I, windows: bool) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| candidate_rank(name, windows).map(|rank| (rank, name)))
        .min()
        .map(|(_, name)| name)
}

/// Resolves the port to open: the configured one, else the best candidate.
pub fn discover_port(configured: Option<&str>) -> ReaderResult<String> {
    if let Some(port) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(port.to_string());
    }

    let ports = list_ports();
    let names: Vec<String> = ports.into_iter().map(|p| p.name).collect();

    match select_port(names.iter().map(String::as_str), cfg!(windows)) {
        Some(name) => {
            info!(port = %name, seen = names.len(), "Discovered RFID reader port");
            Ok(name.to_string())
        }
        None => Err(ReaderError::DeviceNotFound { candidates: names }),
    }
}

// =============================================================================
// Opening
// =============================================================================

/// Opens `name` at `baud_rate` with 8N1, no flow control.
pub fn open_port(
    name: &str,
    baud_rate: u32,
    read_timeout: Duration,
) -> ReaderResult<Box<dyn SerialPort>> {
    let open_err = |e: serialport::Error| ReaderError::Open {
        port: name.to_string(),
        message: e.to_string(),
    };

    let port = serialport::new(name, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(read_timeout)
        .open()
        .map_err(open_err)?;

    // Stale bytes from before we opened would arrive as a torn first line
    port.clear(serialport::ClearBuffer::Input).map_err(open_err)?;

    debug!(port = %name, baud_rate, "Serial port opened");
    Ok(port)
}
