//! # State Module
//!
//! Long-lived station state, each type with one concern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐   │
//! │  │  StationConfig   │  │   ReaderState    │  │  Database (rentrack- │   │
//! │  │                  │  │                  │  │  db, pooled, Clone)  │   │
//! │  │  station.toml +  │  │  TagReader +     │  │                      │   │
//! │  │  RENTRACK_* env  │  │  event sender    │  │                      │   │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘   │
//! │                                                                         │
//! │  StationConfig: read-only after startup                                 │
//! │  ReaderState:   owned by the console loop                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod reader;

pub use config::{
    ConfigError, DatabaseSettings, DisplaySettings, ReaderSettings, RentalSettings,
    StationConfig,
};
pub use reader::{ReaderState, ReaderStatus};
