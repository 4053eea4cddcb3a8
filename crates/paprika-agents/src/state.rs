//! Per-agent mutable state: location, hand, busy flag, last outcome.
//!
//! Every dispatched action gets an [`ActionTicket`]. Only the report that
//! carries the ticket of the action currently in flight may clear the busy
//! flag; a report from an action the executor already gave up on is
//! discarded, so it can never end a later step early.

use paprika_types::ActionStatus;
use tracing::debug;

/// Location reported before the agent has entered any zone.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Identifies one dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionTicket(u64);

impl ActionTicket {
    /// The raw sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ActionTicket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The agent state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentState {
    location: String,
    held_item: Option<String>,
    busy: bool,
    last_status: ActionStatus,
    last_error: Option<String>,
    in_flight: Option<ActionTicket>,
    issued: u64,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentState {
    /// Fresh state: unknown location, empty hand, idle.
    pub fn new() -> Self {
        Self {
            location: UNKNOWN_LOCATION.to_owned(),
            held_item: None,
            busy: false,
            last_status: ActionStatus::None,
            last_error: None,
            in_flight: None,
            issued: 0,
        }
    }

    /// Mark an action as in flight and issue its ticket.
    pub const fn begin_action(&mut self) -> ActionTicket {
        self.issued = self.issued.saturating_add(1);
        let ticket = ActionTicket(self.issued);
        self.in_flight = Some(ticket);
        self.busy = true;
        ticket
    }

    /// Record the terminal outcome of the action holding `ticket`.
    ///
    /// Returns `false` and changes nothing if `ticket` is not the action in
    /// flight.
    pub fn report(&mut self, ticket: ActionTicket, status: ActionStatus, message: &str) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(
                %ticket,
                status = %status,
                report = message,
                "discarding report from abandoned action"
            );
            return false;
        }
        self.last_status = status;
        self.last_error = Some(message.to_owned());
        self.busy = false;
        self.in_flight = None;
        true
    }

    /// Clear the busy flag without a handler report, recording a failure.
    ///
    /// Used by the executor when the per-step timeout fires.
    pub fn force_idle(&mut self, message: &str) {
        self.last_status = ActionStatus::Failure;
        self.last_error = Some(message.to_owned());
        self.busy = false;
        self.in_flight = None;
    }

    /// Whether an action is in flight.
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Ticket of the action in flight.
    pub const fn in_flight(&self) -> Option<ActionTicket> {
        self.in_flight
    }

    /// Last known room.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Update the last known room.
    pub fn set_location(&mut self, location: &str) {
        if self.location != location {
            debug!(from = %self.location, to = location, "agent changed location");
            location.clone_into(&mut self.location);
        }
    }

    /// Current hand contents.
    pub fn held_item(&self) -> Option<&str> {
        self.held_item.as_deref()
    }

    /// Put an item in the (single) hand slot, replacing whatever was there.
    pub fn set_held_item(&mut self, item: &str) {
        self.held_item = Some(item.to_owned());
    }

    /// Empty the hand, returning what it held.
    pub const fn take_held_item(&mut self) -> Option<String> {
        self.held_item.take()
    }

    /// Status of the last completed action.
    pub const fn last_status(&self) -> ActionStatus {
        self.last_status
    }

    /// Message of the last completed action.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
