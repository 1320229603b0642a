//! # Reader Commands
//!
//! Start, stop and inspect the RFID reader.

use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::state::{ReaderState, ReaderStatus};
use rentrack_reader::{list_ports, PortInfo};

/// A serial port the OS reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDto {
    pub name: String,
    pub product: Option<String>,
}

impl From<PortInfo> for PortDto {
    fn from(p: PortInfo) -> Self {
        PortDto {
            name: p.name,
            product: p.product,
        }
    }
}

pub fn reader_status(reader: &ReaderState) -> ReaderStatus {
    reader.status()
}

/// Starts the reader. Already running is not an error.
pub fn start_reader(reader: &mut ReaderState) -> ApiResult<ReaderStatus> {
    reader.start()?;
    Ok(reader.status())
}

/// Stops the reader and releases the device.
pub fn stop_reader(reader: &mut ReaderState) -> ReaderStatus {
    reader.stop();
    info!("Reader stopped by operator");
    reader.status()
}

pub fn list_serial_ports() -> Vec<PortDto> {
    list_ports().into_iter().map(PortDto::from).collect()
}
