//! # rentrack-db: Database Layer for the Rental Station
//!
//! SQLite storage for products and rentals, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rentrack Data Flow                               │
//! │                                                                         │
//! │  Station command (confirm_end)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │                   rentrack-db (THIS CRATE)                        │  │
//! │  │                                                                   │  │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────────┐   │  │
//! │  │   │   Database    │   │  Repositories  │   │   Migrations     │   │  │
//! │  │   │   (pool.rs)   │◄──│  Product       │   │   (embedded)     │   │  │
//! │  │   │  SqlitePool   │   │  Rental        │   │ 001_initial.sql  │   │  │
//! │  │   └───────────────┘   └────────────────┘   └──────────────────┘   │  │
//! │  │            ▲                                                      │  │
//! │  │            └──── RentalGateway (gateway.rs)                       │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │   SQLite: <data dir>/rental.db                                    │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and [`Database`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - Product and rental SQL
//! - [`gateway`] - [`RentalGateway`] contract
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentrack_db::{Database, DbConfig, RentalGateway};
//!
//! let db = Database::new(DbConfig::new("rental.db")).await?;
//! let product = db.fetch_product_by_tag(&tag).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use gateway::RentalGateway;
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::rental::RentalRepository;
