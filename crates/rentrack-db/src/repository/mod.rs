//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Station command                                                        │
//! │       │   db.products().get_by_tag(&tag)                                │
//! │       │   db.rentals().open(&new_rental)                                │
//! │       ▼                                                                 │
//! │  ProductRepository            RentalRepository                          │
//! │  ├── insert / update          ├── open / close   (transactional)        │
//! │  ├── delete                   ├── insert / end   (single row)           │
//! │  ├── get_by_id / get_by_tag   ├── active_for_product                    │
//! │  ├── list                     └── history / active                      │
//! │  └── set_status                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod rental;
