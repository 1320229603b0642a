//! # Reader Errors

use thiserror::Error;

/// RFID reader errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// No port was configured and none matched the discovery heuristic.
    ///
    /// ## When This Occurs
    /// - Reader unplugged
    /// - USB-serial driver not installed
    /// - Port named unusually (set `reader.port` in station.toml)
    #[error("No RFID reader found (ports seen: {})", format_candidates(.candidates))]
    DeviceNotFound { candidates: Vec<String> },

    /// The port exists but could not be opened or configured.
    ///
    /// ## When This Occurs
    /// - Another program holds the port
    /// - Permission denied (user not in `dialout`)
    /// - Configured path doesn't exist
    #[error("Cannot open {port}: {message}")]
    Open { port: String, message: String },

    /// I/O failure mid-session. The read loop has stopped.
    #[error("Reader I/O error: {0}")]
    Device(String),

    /// The OS refused to start the reader thread.
    #[error("Cannot start reader thread: {0}")]
    Thread(String),
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "none".to_string()
    } else {
        candidates.join(", ")
    }
}

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_lists_candidates() {
        let err = ReaderError::DeviceNotFound {
            candidates: vec![],
        };
        assert_eq!(err.to_string(), "No RFID reader found (ports seen: none)");

        let err = ReaderError::DeviceNotFound {
            candidates: vec!["/dev/cu.Bluetooth-Incoming-Port".to_string()],
        };
        assert!(err.to_string().contains("Bluetooth"));
    }
}
