//! # Station Dispatcher
//!
//! Routes reader events to the one active view and keeps the pending
//! confirmation between a detection and the operator's answer.
//!
//! ## Event Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReaderEvent::Detected { tag, at }                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Debouncer::should_dispatch(tag, at) ── no ──► Dispatch::Suppressed     │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  match active view                                                      │
//! │     Registration ──► remember tag for the form ──► TagForRegistration   │
//! │     Rental       ──► commands::rental::detect   ──► Detection           │
//! │                        (StartProposal / EndProposal become pending)     │
//! │     History      ──► Ignored                                            │
//! │                                                                         │
//! │  ReaderEvent::Failed(e) ──► Dispatch::ReaderFailed(e)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Switching views resets the debouncer and drops any pending proposal.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::commands::rental::{self, Detection, RentalDto};
use crate::error::{ApiError, ApiResult, ErrorCode};
use rentrack_core::{CustomerDetails, Debouncer, TagId};
use rentrack_db::RentalGateway;
use rentrack_reader::{ReaderError, ReaderEvent};

/// The screen that currently receives tag detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    Registration,
    Rental,
    History,
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActiveView::Registration => "registration",
            ActiveView::Rental => "rental",
            ActiveView::History => "history",
        })
    }
}

/// What became of a reader event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Same tag again within the cooldown.
    Suppressed,

    /// Registration view: the tag is now in the form.
    TagForRegistration(TagId),

    /// Rental view: the resolved proposal.
    Detection(Detection),

    /// The active view does not take tags.
    Ignored,

    /// The reader loop died.
    ReaderFailed(ReaderError),
}

/// A transition waiting for the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Start(TagId),
    End(TagId),
}

pub struct Station<G> {
    db: G,
    view: ActiveView,
    debouncer: Debouncer,
    pending: Option<Pending>,
    registration_tag: Option<TagId>,
}

impl<G: RentalGateway> Station<G> {
    /// Starts in the rental view.
    pub fn new(db: G, cooldown: Duration) -> Self {
        Station {
            db,
            view: ActiveView::Rental,
            debouncer: Debouncer::new(cooldown),
            pending: None,
            registration_tag: None,
        }
    }

    pub fn db(&self) -> &G {
        &self.db
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    /// Tag captured for the registration form, if any.
    pub fn registration_tag(&self) -> Option<&TagId> {
        self.registration_tag.as_ref()
    }

    pub fn set_view(&mut self, view: ActiveView) {
        if view == self.view {
            return;
        }

        info!(from = %self.view, to = %view, "Active view changed");
        self.view = view;
        self.debouncer.reset();
        self.pending = None;
    }

    /// Routes one reader event to the active view.
    pub async fn handle_event(&mut self, event: ReaderEvent) -> ApiResult<Dispatch> {
        let (tag, at) = match event {
            ReaderEvent::Detected { tag, at } => (tag, at),
            ReaderEvent::Failed(e) => {
                warn!(error = %e, "RFID reader failed");
                return Ok(Dispatch::ReaderFailed(e));
            }
        };

        if !self.debouncer.should_dispatch(&tag, at) {
            debug!(tag = %tag, "Detection suppressed");
            return Ok(Dispatch::Suppressed);
        }

        match self.view {
            ActiveView::Registration => {
                self.registration_tag = Some(tag.clone());
                Ok(Dispatch::TagForRegistration(tag))
            }
            ActiveView::Rental => {
                // A new scan replaces the proposal, even when detection fails
                self.pending = None;
                let detection = rental::detect(&self.db, &tag, Utc::now()).await?;
                self.pending = match &detection {
                    Detection::Unregistered { .. } => {
                        self.registration_tag = Some(tag);
                        None
                    }
                    Detection::StartProposal { .. } => Some(Pending::Start(tag)),
                    Detection::EndProposal { .. } => Some(Pending::End(tag)),
                };
                Ok(Dispatch::Detection(detection))
            }
            ActiveView::History => Ok(Dispatch::Ignored),
        }
    }

    /// Confirms a pending start with the customer's details.
    ///
    /// Invalid details keep the proposal so the operator can correct them.
    pub async fn confirm_start(&mut self, customer: CustomerDetails) -> ApiResult<RentalDto> {
        let Some(Pending::Start(tag)) = self.pending.take() else {
            return Err(self.nothing_pending("start"));
        };

        let result = rental::confirm_start(&self.db, &tag, customer, Utc::now()).await;
        if matches!(&result, Err(e) if e.code == ErrorCode::ValidationError) {
            self.pending = Some(Pending::Start(tag));
        }
        result
    }

    pub async fn confirm_end(&mut self) -> ApiResult<RentalDto> {
        let Some(Pending::End(tag)) = self.pending.take() else {
            return Err(self.nothing_pending("end"));
        };

        rental::confirm_end(&self.db, &tag, Utc::now()).await
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Clears the registration tag once it has been used.
    pub fn take_registration_tag(&mut self) -> Option<TagId> {
        self.registration_tag.take()
    }

    fn nothing_pending(&mut self, action: &str) -> ApiError {
        // A mismatched pending proposal is dropped as well
        self.pending = None;
        ApiError::new(
            ErrorCode::RentalState,
            format!("No rental to {} - scan a tag in the rental view first", action),
        )
    }
}
