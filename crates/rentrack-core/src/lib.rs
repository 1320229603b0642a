//! # rentrack-core: Pure Business Logic for the Rental Station
//!
//! Every decision the station makes about an RFID detection lives here,
//! as plain functions and small state holders with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rentrack Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────┐          ┌─────────────────────────────────┐  │
//! │  │  rentrack-reader     │  frames  │  apps/station                   │  │
//! │  │  serial thread ──────┼─────────►│  queue ► debounce ► active view │  │
//! │  └──────────────────────┘          └───────────────┬─────────────────┘  │
//! │                                                    │                    │
//! │  ┌─────────────────────────────────────────────────▼─────────────────┐  │
//! │  │               ★ rentrack-core (THIS CRATE) ★                      │  │
//! │  │                                                                   │  │
//! │  │   ┌─────────┐  ┌──────────┐  ┌─────────┐  ┌────────┐  ┌────────┐  │  │
//! │  │   │  frame  │  │ debounce │  │ rental  │  │pricing │  │ money  │  │  │
//! │  │   │  TagId  │  │Debouncer │  │ resolve │  │  cost  │  │ cents  │  │  │
//! │  │   └─────────┘  └──────────┘  └─────────┘  └────────┘  └────────┘  │  │
//! │  │                                                                   │  │
//! │  │   NO I/O • NO DATABASE • NO SERIAL PORT • PURE FUNCTIONS          │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │                                   │                                     │
//! │  ┌────────────────────────────────▼──────────────────────────────────┐  │
//! │  │                 rentrack-db (Persistence Gateway)                 │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`frame`] - Serial frame → [`TagId`] parsing
//! - [`debounce`] - Suppression of a tag lingering in range
//! - [`rental`] - Rental state resolver (start / end decision)
//! - [`pricing`] - Cost of a rental from rate, mode and elapsed time
//! - [`money`] - Integer-cent money type
//! - [`types`] - Products, rentals, registration inputs
//! - [`validation`] - Form input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rentrack_core::frame::parse_frame;
//!
//! let raw = [
//!     0xa5, 0x5a, 0x00, 0x19, 0x83, 0x30, 0x00, 0xe2, 0x00, 0x00,
//!     0x1b, 0x26, 0x0c, 0x02, 0x56, 0x20, 0x50, 0xe0, 0xf8, 0x00,
//!     0xc0, 0x01, 0x84, 0x0d, 0x0a,
//! ];
//!
//! let tag = parse_frame(&raw).unwrap();
//! assert_eq!(tag.as_str(), "a55a0019833000e200001b260c02562050e0f800");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod debounce;
pub mod error;
pub mod frame;
pub mod money;
pub mod pricing;
pub mod rental;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use debounce::Debouncer;
pub use error::{CoreError, CoreResult, ValidationError};
pub use frame::{parse_frame, TagId};
pub use money::Money;
pub use rental::{resolve, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default interval during which a repeat read of the same tag is ignored.
///
/// A tag held near the antenna is reported many times per second; five
/// seconds is long enough for the operator to pull the tool away.
pub const DEFAULT_DEBOUNCE_COOLDOWN_SECS: u64 = 5;

/// Maximum planned rental duration, in units of the rental type.
pub const MAX_PLANNED_DURATION: i64 = 1000;
