//! # rentrack Station Library
//!
//! Wires configuration, storage and the RFID reader into the console
//! station.
//!
//! ## Module Organization
//! ```text
//! rentrack_station/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── config.rs   ◄─── station.toml + RENTRACK_* overrides
//! │   └── reader.rs   ◄─── TagReader + event queue
//! ├── commands/
//! │   ├── product.rs  ◄─── Register / edit / delete / list
//! │   ├── rental.rs   ◄─── detect / confirm_start / confirm_end
//! │   ├── history.rs  ◄─── History and active rentals
//! │   └── reader.rs   ◄─── Reader control
//! ├── station.rs      ◄─── Active view, debounce, pending proposal
//! ├── console.rs      ◄─── Command parsing, rendering, select! loop
//! └── error.rs        ◄─── ApiError for commands
//! ```

pub mod commands;
pub mod console;
pub mod error;
pub mod state;
pub mod station;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use console::{App, DisplayFormat};
use rentrack_db::{Database, DbConfig};
use state::{ReaderState, StationConfig};
use station::Station;

/// Runs the station until the operator quits.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize logging (RUST_LOG or info,rentrack=debug,sqlx=warn)      │
/// │  2. Load StationConfig (defaults → station.toml → RENTRACK_* env)       │
/// │  3. Open the database, run migrations                                   │
/// │  4. Create ReaderState; start the reader if reader.autostart            │
/// │     (a missing reader is reported, the station still runs)              │
/// │  5. Console loop: stdin + reader events                                 │
/// │  6. On quit: stop the reader (joins the thread), close the pool         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting rentrack station");

    let config = StationConfig::load(None).context("Failed to load station config")?;
    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(
        DbConfig::new(&db_path).max_connections(config.database.max_connections),
    )
    .await
    .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database connected and migrations applied");

    let (mut reader, events) = ReaderState::new(config.reader_config());
    if config.reader.autostart {
        if let Err(e) = reader.start() {
            warn!(error = %e, "RFID reader not started");
            println!("RFID reader not started: {}. Type `reader start` to retry.", e);
        }
    }

    let format = DisplayFormat::from_config(&config)?;
    let station = Station::new(db.clone(), config.debounce_cooldown());
    let mut app = App::new(station, reader, format, config.rental.history_limit);

    println!("rentrack station ready. Type `help` for commands.");
    let result = app.run(events).await;

    app.shutdown();
    db.close().await;

    result.context("Console I/O failed")
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so they don't interleave with console output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rentrack=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
