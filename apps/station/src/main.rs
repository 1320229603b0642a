//! # rentrack Station Entry Point
//!
//! The setup lives in `lib.rs` for testability.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rentrack_station::run().await
}
