//! # Commands Module
//!
//! Everything the operator can ask the station to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── product.rs  ◄─── Register, edit, delete, list
//! ├── rental.rs   ◄─── detect / confirm_start / confirm_end
//! ├── history.rs  ◄─── Rental history, active rentals
//! └── reader.rs   ◄─── Reader start/stop/status, port listing
//! ```
//!
//! Storage-backed commands are generic over [`RentalGateway`], so each
//! one declares only that it needs storage:
//!
//! ```rust,ignore
//! async fn confirm_end<G: RentalGateway>(db: &G, tag: &TagId, now) -> ApiResult<RentalDto>
//! ```
//!
//! [`RentalGateway`]: rentrack_db::RentalGateway

pub mod history;
pub mod product;
pub mod reader;
pub mod rental;
