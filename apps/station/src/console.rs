//! # Console Station
//!
//! Line-oriented operator interface. Reader events and typed commands are
//! handled on the same task, one at a time.
//!
//! ```text
//! ┌──────────────┐        tokio::select!        ┌─────────────────────────┐
//! │ stdin lines  │ ───────────┐   ┌──────────── │ ReaderEvent queue       │
//! └──────────────┘            ▼   ▼             └─────────────────────────┘
//!                          App::handle_line / App::handle_event
//!                                  │
//!                                  ▼
//!                       Station (view, debounce, pending)
//!                                  │
//!                                  ▼
//!                         rendered text on stdout
//! ```
//!
//! ## Commands
//! ```text
//! view register|rental|history
//! products
//! register name=Cutter 11; rate=100; type=per day [; category=Cutters] [; tag=a55a...]
//! edit <id> rate=120 [; name=...] [; type=...] [; category=...] [; tag=...]
//! delete <id>
//! scan <tag>
//! start name=Ravi; phone=98450 12345; place=Whitefield; duration=2 [; email=...] [; vehicle=...]
//! end | cancel
//! history [limit] | active
//! reader start|stop|status|ports
//! help | quit
//! ```

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::commands::history::{self, HistoryEntryDto};
use crate::commands::product::{self, ProductDto, ProductInput};
use crate::commands::reader;
use crate::commands::rental::{Detection, RentalDto};
use crate::error::{ApiError, ApiResult};
use crate::state::{ConfigError, ReaderState, ReaderStatus, StationConfig};
use crate::station::{ActiveView, Dispatch, Station};
use rentrack_core::{CustomerDetails, Money, RentalType, TagId};
use rentrack_db::RentalGateway;
use rentrack_reader::ReaderEvent;

const HELP: &str = "\
Commands:
  view register|rental|history     switch the screen that receives tag scans
  products                         list registered products
  register name=..; rate=..; type=per day|per hour [; category=..] [; tag=..]
  edit <id> field=value; ...       change name, tag, category, type or rate
  delete <id>                      remove a product with no rentals
  scan <tag>                       type a tag instead of tapping it
  start name=..; phone=..; place=..; duration=N [; email=..] [; vehicle=..]
  end                              confirm the proposed return
  cancel                           drop the current proposal
  history [limit] | active         browse rentals
  reader start|stop|status|ports   control the RFID reader
  help | quit";

// =============================================================================
// Display Formatting
// =============================================================================

/// Timestamp and money formatting for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    offset: FixedOffset,
    currency_symbol: String,
}

impl DisplayFormat {
    pub fn new(offset: FixedOffset, currency_symbol: impl Into<String>) -> Self {
        Self {
            offset,
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn from_config(config: &StationConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.display_offset()?,
            config.display.currency_symbol.clone(),
        ))
    }

    /// `2024-01-01 05:30 AM` in the display offset, or `N/A`.
    pub fn timestamp(&self, at: Option<DateTime<Utc>>) -> String {
        match at {
            Some(at) => at
                .with_timezone(&self.offset)
                .format("%Y-%m-%d %I:%M %p")
                .to_string(),
            None => "N/A".to_string(),
        }
    }

    pub fn money(&self, cents: i64) -> String {
        let amount = Money::from_cents(cents.saturating_abs());
        let sign = if cents < 0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency_symbol, amount)
    }

    fn rate(&self, cents: i64, rental_type: RentalType) -> String {
        format!("{} {}", self.money(cents), rental_type)
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        StationConfig::default()
            .display_offset()
            .map(|offset| Self::new(offset, "₹"))
            .unwrap_or_else(|_| Self::new(Utc.fix(), "₹"))
    }
}

// =============================================================================
// Command Parsing
// =============================================================================

/// `key=value` pairs from a `;`-separated argument list.
pub type Fields = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    Start,
    Stop,
    Status,
    Ports,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    View(ActiveView),
    Products,
    Register(Fields),
    Edit(i64, Fields),
    Delete(i64),
    Scan(String),
    Start(Fields),
    End,
    Cancel,
    History(Option<u32>),
    Active,
    Reader(ReaderAction),
    Quit,
}

/// Parses one input line. Blank lines are `Ok(None)`.
pub fn parse_command(line: &str) -> ApiResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "view" => Command::View(parse_view(rest)?),
        "products" => Command::Products,
        "register" => Command::Register(parse_fields(rest)?),
        "edit" => {
            let (id, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Edit(parse_id(id)?, parse_fields(fields)?)
        }
        "delete" => Command::Delete(parse_id(rest)?),
        "scan" if !rest.is_empty() => Command::Scan(rest.to_string()),
        "scan" => return Err(ApiError::validation("Usage: scan <tag>")),
        "start" => Command::Start(parse_fields(rest)?),
        "end" => Command::End,
        "cancel" => Command::Cancel,
        "history" if rest.is_empty() => Command::History(None),
        "history" => Command::History(Some(rest.parse().map_err(|_| {
            ApiError::validation(format!("Invalid history limit: {}", rest))
        })?)),
        "active" => Command::Active,
        "reader" => Command::Reader(match rest.to_ascii_lowercase().as_str() {
            "start" => ReaderAction::Start,
            "stop" => ReaderAction::Stop,
            "" | "status" => ReaderAction::Status,
            "ports" => ReaderAction::Ports,
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown reader action: {}",
                    other
                )))
            }
        }),
        other => {
            return Err(ApiError::validation(format!(
                "Unknown command: {} (type `help`)",
                other
            )))
        }
    };

    Ok(Some(command))
}

fn parse_view(name: &str) -> ApiResult<ActiveView> {
    match name.to_ascii_lowercase().as_str() {
        "register" | "registration" => Ok(ActiveView::Registration),
        "rental" | "rentals" => Ok(ActiveView::Rental),
        "history" => Ok(ActiveView::History),
        other => Err(ApiError::validation(format!("Unknown view: {}", other))),
    }
}

fn parse_id(text: &str) -> ApiResult<i64> {
    text.trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid product id: {}", text.trim())))
}

/// Parses `a=1; b = two words`. Keys are lowercased; values trimmed.
pub fn parse_fields(text: &str) -> ApiResult<Fields> {
    let mut fields = Fields::new();

    for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            ApiError::validation(format!("Expected key=value, got: {}", part))
        })?;
        fields.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(fields)
}

fn customer_from_fields(fields: &Fields) -> ApiResult<CustomerDetails> {
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| fields.get(*k))
            .cloned()
            .unwrap_or_default()
    };

    let duration = text(&["duration", "planned_duration"]);
    let planned_duration = if duration.is_empty() {
        0
    } else {
        duration.parse().map_err(|_| {
            ApiError::validation(format!("duration must be a whole number, got: {}", duration))
        })?
    };

    Ok(CustomerDetails {
        customer_name: text(&["name", "customer"]),
        phone: text(&["phone"]),
        email: fields.get("email").cloned(),
        vehicle: fields.get("vehicle").cloned(),
        place: text(&["place"]),
        planned_duration,
    })
}

fn apply_product_fields(input: &mut ProductInput, fields: &Fields) {
    for (key, value) in fields {
        match key.as_str() {
            "tag" | "tag_id" => input.tag_id = value.clone(),
            "name" => input.name = value.clone(),
            "category" => input.category = Some(value.clone()),
            "type" | "rental_type" => input.rental_type = value.clone(),
            "rate" => input.rate = value.clone(),
            _ => {}
        }
    }
}

// =============================================================================
// App
// =============================================================================

/// Result of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// The console front end: station, reader and formatting.
pub struct App<G> {
    station: Station<G>,
    reader: ReaderState,
    format: DisplayFormat,
    history_limit: u32,
}

impl<G: RentalGateway> App<G> {
    pub fn new(
        station: Station<G>,
        reader: ReaderState,
        format: DisplayFormat,
        history_limit: u32,
    ) -> Self {
        Self {
            station,
            reader,
            format,
            history_limit,
        }
    }

    pub fn station(&self) -> &Station<G> {
        &self.station
    }

    pub fn prompt(&self) -> String {
        format!("[{}] > ", self.station.view())
    }

    /// Reads stdin and reader events until `quit` or end of input.
    pub async fn run(&mut self, mut events: UnboundedReceiver<ReaderEvent>) -> io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        print_prompt(&self.prompt())?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Console input closed");
                        break;
                    };
                    match self.handle_line(&line).await {
                        Flow::Quit => break,
                        Flow::Continue(output) => print_output(&output),
                    }
                }
                Some(event) = events.recv() => {
                    print_output(&self.handle_event(event).await);
                }
            }
            print_prompt(&self.prompt())?;
        }

        Ok(())
    }

    /// Stops the reader.
    pub fn shutdown(&mut self) {
        self.reader.stop();
        info!("Station shut down");
    }

    /// Handles a reader event and renders the outcome.
    pub async fn handle_event(&mut self, event: ReaderEvent) -> String {
        match self.station.handle_event(event).await {
            Ok(dispatch) => self.render_dispatch(&dispatch),
            Err(e) => render_error(&e),
        }
    }

    /// Handles one typed line.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue(String::new()),
            Err(e) => return Flow::Continue(render_error(&e)),
        };

        if command == Command::Quit {
            return Flow::Quit;
        }

        match self.execute(command).await {
            Ok(output) => Flow::Continue(output),
            Err(e) => Flow::Continue(render_error(&e)),
        }
    }

    async fn execute(&mut self, command: Command) -> ApiResult<String> {
        let db = self.station.db();
        let now = Utc::now();

        match command {
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok(String::new()),
            Command::View(view) => {
                self.station.set_view(view);
                Ok(format!("Now in {} view", view))
            }
            Command::Products => {
                let products = product::list_products(db).await?;
                Ok(self.render_products(&products))
            }
            Command::Register(fields) => {
                let mut input = ProductInput {
                    tag_id: self
                        .station
                        .registration_tag()
                        .map(TagId::to_string)
                        .unwrap_or_default(),
                    rental_type: RentalType::default().to_string(),
                    ..Default::default()
                };
                apply_product_fields(&mut input, &fields);
                if input.tag_id.is_empty() {
                    return Err(ApiError::validation(
                        "No tag: scan one in the registration view or give tag=...",
                    ));
                }

                let created = product::register_product(db, input).await?;
                self.station.take_registration_tag();
                Ok(format!(
                    "Registered #{} {} ({})",
                    created.id, created.name, created.tag_id
                ))
            }
            Command::Edit(id, fields) => {
                let current = product::get_product(db, id).await?;
                let mut input = ProductInput::from_product(&current);
                apply_product_fields(&mut input, &fields);

                let updated = product::update_product(db, id, input).await?;
                Ok(format!(
                    "Updated #{} {}: {}",
                    updated.id,
                    updated.name,
                    self.format.rate(updated.rate_cents, updated.rental_type)
                ))
            }
            Command::Delete(id) => {
                product::delete_product(db, id).await?;
                Ok(format!("Deleted product #{}", id))
            }
            Command::Scan(tag) => {
                let tag = TagId::parse(&tag)?;
                let dispatch = self
                    .station
                    .handle_event(ReaderEvent::Detected {
                        tag,
                        at: Instant::now(),
                    })
                    .await?;
                Ok(self.render_dispatch(&dispatch))
            }
            Command::Start(fields) => {
                let customer = customer_from_fields(&fields)?;
                let rental = self.station.confirm_start(customer).await?;
                Ok(self.render_started(&rental))
            }
            Command::End => {
                let rental = self.station.confirm_end().await?;
                Ok(self.render_ended(&rental))
            }
            Command::Cancel => Ok(if self.station.cancel() {
                "Proposal dropped".to_string()
            } else {
                "Nothing to cancel".to_string()
            }),
            Command::History(limit) => {
                let limit = limit.unwrap_or(self.history_limit);
                let rows = history::rental_history(db, limit, now).await?;
                Ok(self.render_history(&rows))
            }
            Command::Active => {
                let rows = history::active_rentals(db, now).await?;
                Ok(self.render_history(&rows))
            }
            Command::Reader(action) => match action {
                ReaderAction::Start => {
                    let status = reader::start_reader(&mut self.reader)?;
                    Ok(render_reader_status(&status))
                }
                ReaderAction::Stop => Ok(render_reader_status(&reader::stop_reader(
                    &mut self.reader,
                ))),
                ReaderAction::Status => {
                    Ok(render_reader_status(&reader::reader_status(&self.reader)))
                }
                ReaderAction::Ports => {
                    let ports = reader::list_serial_ports();
                    if ports.is_empty() {
                        return Ok("No serial ports found".to_string());
                    }
                    Ok(ports
                        .iter()
                        .map(|p| match &p.product {
                            Some(product) => format!("{}  ({})", p.name, product),
                            None => p.name.clone(),
                        })
                        .collect::<Vec<_>>()
                        .join("\n"))
                }
            },
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn render_dispatch(&self, dispatch: &Dispatch) -> String {
        match dispatch {
            Dispatch::Suppressed | Dispatch::Ignored => String::new(),
            Dispatch::TagForRegistration(tag) => format!(
                "Tag {} captured. Register with: register name=..; rate=..; type=per day",
                tag
            ),
            Dispatch::Detection(detection) => self.render_detection(detection),
            Dispatch::ReaderFailed(e) => {
                format!("Reader stopped: {}. Type `reader start` to retry.", e)
            }
        }
    }

    fn render_detection(&self, detection: &Detection) -> String {
        match detection {
            Detection::Unregistered { tag_id } => format!(
                "Tag {} is not registered. Use `view register` then `register ...` to add it.",
                tag_id
            ),
            Detection::StartProposal { product } => format!(
                "{} is available at {}.\nStart: start name=..; phone=..; place=..; duration=N",
                product.name,
                self.format.rate(product.rate_cents, product.rental_type)
            ),
            Detection::EndProposal {
                product,
                rental,
                elapsed_units,
                total_cents,
            } => format!(
                "{} is out with {} ({}) since {}.\nElapsed {:.2} {}, total {}. Type `end` to confirm the return.",
                product.name,
                rental.customer_name,
                rental.phone,
                self.format.timestamp(Some(rental.started_at)),
                elapsed_units,
                rental.rental_type.unit_label(),
                self.format.money(*total_cents)
            ),
        }
    }

    fn render_started(&self, rental: &RentalDto) -> String {
        format!(
            "Rental #{} started for {} at {} ({} planned {}).",
            rental.id,
            rental.customer_name,
            self.format.timestamp(Some(rental.started_at)),
            rental.planned_duration,
            rental.rental_type.unit_label()
        )
    }

    fn render_ended(&self, rental: &RentalDto) -> String {
        format!(
            "Rental #{} ended at {}. Total: {}",
            rental.id,
            self.format.timestamp(rental.ended_at),
            rental
                .total_cost_cents
                .map(|c| self.format.money(c))
                .unwrap_or_else(|| "N/A".to_string())
        )
    }

    fn render_products(&self, products: &[ProductDto]) -> String {
        if products.is_empty() {
            return "No products registered".to_string();
        }

        let mut out = String::new();
        for p in products {
            let _ = writeln!(
                out,
                "#{:<4} {:<20} {:<10} {:<9} {:<20} {}",
                p.id,
                p.name,
                p.category.as_deref().unwrap_or("-"),
                p.status,
                self.format.rate(p.rate_cents, p.rental_type),
                p.tag_id
            );
        }
        out.trim_end().to_string()
    }

    fn render_history(&self, rows: &[HistoryEntryDto]) -> String {
        if rows.is_empty() {
            return "No rentals".to_string();
        }

        let mut out = String::new();
        for r in rows {
            let _ = writeln!(
                out,
                "#{:<4} {:<20} {:<16} {} → {}  {}{}",
                r.rental_id,
                r.product_name,
                r.customer_name,
                self.format.timestamp(Some(r.started_at)),
                self.format.timestamp(r.ended_at),
                self.format.money(r.cost_cents),
                if r.active { " (so far)" } else { "" }
            );
        }
        out.trim_end().to_string()
    }
}

fn render_error(e: &ApiError) -> String {
    format!("Error: {}", e.message)
}

fn render_reader_status(status: &ReaderStatus) -> String {
    match (status.running, status.port.as_deref()) {
        (true, Some(port)) => format!("Reader running on {}", port),
        (true, None) => "Reader running".to_string(),
        (false, _) => "Reader stopped".to_string(),
    }
}

fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{}", output);
    }
}

fn print_prompt(prompt: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rentrack_db::{Database, DbConfig};
    use rentrack_reader::ReaderConfig;
    use std::time::Duration;

    const CUTTER_TAG: &str = "a55a0019833000e200001b260c02562050e0f800";

    async fn app() -> App<Database> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (reader, _events) = ReaderState::new(ReaderConfig::default());
        App::new(
            Station::new(db, Duration::from_secs(5)),
            reader,
            DisplayFormat::default(),
            50,
        )
    }

    async fn say(app: &mut App<Database>, line: &str) -> String {
        match app.handle_line(line).await {
            Flow::Continue(out) => out,
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_timestamp_in_display_offset() {
        let format = DisplayFormat::default();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format.timestamp(Some(at)), "2024-01-01 05:30 AM");

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap();
        assert_eq!(format.timestamp(Some(at)), "2024-01-01 02:45 PM");

        assert_eq!(format.timestamp(None), "N/A");
    }

    #[test]
    fn test_money_format() {
        let format = DisplayFormat::new(Utc.fix(), "$");
        assert_eq!(format.money(1234), "$12.34");
        assert_eq!(format.money(0), "$0.00");
        assert_eq!(format.money(-1234), "-$12.34");
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("END").unwrap(), Some(Command::End));
        assert_eq!(
            parse_command("view register").unwrap(),
            Some(Command::View(ActiveView::Registration))
        );
        assert_eq!(
            parse_command("history 10").unwrap(),
            Some(Command::History(Some(10)))
        );
        assert_eq!(
            parse_command("reader").unwrap(),
            Some(Command::Reader(ReaderAction::Status))
        );

        let Some(Command::Edit(id, fields)) =
            parse_command("edit 7 rate = 12.50; Name=Cutter 11 ").unwrap()
        else {
            panic!("expected edit");
        };
        assert_eq!(id, 7);
        assert_eq!(fields.get("rate").map(String::as_str), Some("12.50"));
        assert_eq!(fields.get("name").map(String::as_str), Some("Cutter 11"));

        assert!(parse_command("fly").is_err());
        assert!(parse_command("delete seven").is_err());
        assert!(parse_command("register name").is_err());
        assert!(parse_command("scan").is_err());
    }

    #[test]
    fn test_customer_from_fields() {
        let fields = parse_fields("name=Ravi; phone=9845012345; place=HSR; duration=3").unwrap();
        let customer = customer_from_fields(&fields).unwrap();
        assert_eq!(customer.customer_name, "Ravi");
        assert_eq!(customer.planned_duration, 3);
        assert_eq!(customer.email, None);

        let fields = parse_fields("duration=two").unwrap();
        assert!(customer_from_fields(&fields).is_err());
    }

    #[tokio::test]
    async fn test_register_scan_start_end_session() {
        let mut app = app().await;

        say(&mut app, "view register").await;
        let out = say(&mut app, &format!("scan {}", CUTTER_TAG)).await;
        assert!(out.contains("captured"), "{out}");

        let out = say(&mut app, "register name=Cutter 11; rate=100; type=per day").await;
        assert!(out.starts_with("Registered #1 Cutter 11"), "{out}");
        assert!(app.station().registration_tag().is_none());

        say(&mut app, "view rental").await;
        let out = say(&mut app, &format!("scan {}", CUTTER_TAG)).await;
        assert!(out.contains("is available at ₹100.00 Per Day"), "{out}");

        let out = say(&mut app, "start name=Ravi; phone=98450 12345; place=HSR").await;
        assert!(out.starts_with("Error:"), "{out}");

        let out = say(
            &mut app,
            "start name=Ravi; phone=98450 12345; place=HSR; duration=2",
        )
        .await;
        assert!(out.starts_with("Rental #1 started for Ravi"), "{out}");

        let out = say(&mut app, "active").await;
        assert!(out.contains("Cutter 11"), "{out}");
        assert!(out.contains("(so far)"), "{out}");

        // Same tag within the cooldown: nothing shown, nothing proposed
        let out = say(&mut app, &format!("scan {}", CUTTER_TAG)).await;
        assert_eq!(out, "");
        assert!(say(&mut app, "end").await.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_register_without_tag() {
        let mut app = app().await;
        let out = say(&mut app, "register name=Cutter 11; rate=100").await;
        assert!(out.contains("No tag"), "{out}");
    }

    #[tokio::test]
    async fn test_edit_and_delete() {
        let mut app = app().await;
        say(
            &mut app,
            &format!("register tag={}; name=Cutter 11; rate=100", CUTTER_TAG),
        )
        .await;

        let out = say(&mut app, "edit 1 rate=15; type=hourly").await;
        assert_eq!(out, "Updated #1 Cutter 11: ₹15.00 Per Hour");

        let out = say(&mut app, "products").await;
        assert!(out.contains("Available"), "{out}");

        assert_eq!(say(&mut app, "delete 1").await, "Deleted product #1");
        assert_eq!(say(&mut app, "products").await, "No products registered");
    }

    #[tokio::test]
    async fn test_reader_failure_event() {
        let mut app = app().await;
        let out = app
            .handle_event(ReaderEvent::Failed(rentrack_reader::ReaderError::Device(
                "device closed".into(),
            )))
            .await;
        assert!(out.contains("reader start"), "{out}");
        assert_eq!(say(&mut app, "reader status").await, "Reader stopped");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app().await;
        assert_eq!(app.handle_line("quit").await, Flow::Quit);
        assert_eq!(app.prompt(), "[rental] > ");
    }
}
