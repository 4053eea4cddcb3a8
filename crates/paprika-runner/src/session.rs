//! Planner session state machine.
//!
//! The session owns the "thinking" gate between observing and acting:
//! a perception snapshot may only be sent while the agent is connected
//! and idle. Sending one moves the session to awaiting a plan; the
//! planner's answer either starts a plan (executing) or releases the
//! gate. A finished plan releases the gate too.
//!
//! ```text
//! Disconnected -> Connecting -> Idle -> AwaitingPlan -> Executing -> Idle
//!                                 ^          |
//!                                 +----------+  (no task / bad message)
//! ```
//!
//! No I/O happens here. The connection loop feeds events in and acts on
//! what comes back, which keeps every transition testable without a
//! socket.

use core::time::Duration;

use paprika_types::{Plan, PlanResponse, SessionId};
use tracing::{debug, info, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No connection.
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected, free to send a perception snapshot.
    Idle,
    /// A snapshot was sent; waiting for the planner's answer.
    AwaitingPlan,
    /// A plan is executing.
    Executing,
}

/// What the connection loop should do with an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Hand this plan to the executor.
    PlanAccepted(Plan),
    /// The planner has nothing to do; the gate is released.
    NoTask,
    /// The message could not be decoded; the gate is released.
    ProtocolError(String),
    /// The message arrived while a plan was executing and was dropped.
    Ignored,
}

/// One agent's session with the planner.
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    session_id: Option<SessionId>,
    perception_interval: Duration,
    next_perception: Duration,
}

impl Session {
    /// A disconnected session that offers a snapshot every
    /// `perception_interval`.
    pub const fn new(perception_interval: Duration) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            session_id: None,
            perception_interval,
            next_perception: Duration::ZERO,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Identifier of the current connection, if any.
    pub const fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Whether a snapshot is outstanding or a plan is executing.
    pub const fn is_thinking(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingPlan | SessionPhase::Executing
        )
    }

    /// Begin a connection attempt under a fresh session identifier.
    pub fn begin_connect(&mut self) -> SessionId {
        let id = SessionId::new();
        self.session_id = Some(id);
        self.phase = SessionPhase::Connecting;
        info!(session_id = %id, "connecting to planner");
        id
    }

    /// The connection is open. The first snapshot is due immediately.
    pub fn on_open(&mut self, now: Duration) {
        self.phase = SessionPhase::Idle;
        self.next_perception = now;
        info!(session_id = ?self.session_id, "planner session open");
    }

    /// The connection closed or failed. Any plan in progress is the
    /// caller's to abandon.
    pub fn on_closed(&mut self) {
        if self.phase != SessionPhase::Disconnected {
            info!(session_id = ?self.session_id, phase = ?self.phase, "planner session closed");
        }
        self.phase = SessionPhase::Disconnected;
        self.session_id = None;
    }

    /// Whether a snapshot should be sent at logical time `now`.
    ///
    /// The perception loop fires on a fixed cadence whether or not the
    /// gate is open; a firing that finds the agent thinking is skipped.
    pub fn poll_perception(&mut self, now: Duration) -> bool {
        if matches!(
            self.phase,
            SessionPhase::Disconnected | SessionPhase::Connecting
        ) || now < self.next_perception
        {
            return false;
        }
        self.next_perception = now.saturating_add(self.perception_interval);
        if self.is_thinking() {
            debug!(phase = ?self.phase, "perception skipped while thinking");
            return false;
        }
        true
    }

    /// A snapshot went out; close the gate.
    pub fn perception_sent(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::AwaitingPlan;
        }
    }

    /// Decode a planner message and move the gate accordingly.
    pub fn on_message(&mut self, text: &str) -> Inbound {
        if self.phase == SessionPhase::Executing {
            warn!(session_id = ?self.session_id, "planner message received mid-plan, dropping");
            return Inbound::Ignored;
        }
        let response = match PlanResponse::parse(text) {
            Ok(response) => response,
            Err(err) => {
                warn!(session_id = ?self.session_id, error = %err, "malformed planner message");
                self.release();
                return Inbound::ProtocolError(err.to_string());
            }
        };
        if let Some(error) = response.error.as_deref() {
            warn!(session_id = ?self.session_id, error, "planner reported an error");
        }
        match response.into_plan() {
            Some(plan) => {
                info!(
                    session_id = ?self.session_id,
                    task = %plan.task,
                    steps = plan.len(),
                    "plan received"
                );
                self.phase = SessionPhase::Executing;
                Inbound::PlanAccepted(plan)
            }
            None => {
                debug!(session_id = ?self.session_id, "no task");
                self.release();
                Inbound::NoTask
            }
        }
    }

    /// The executor finished the plan it was given.
    pub fn on_plan_finished(&mut self) {
        if self.phase == SessionPhase::Executing {
            self.phase = SessionPhase::Idle;
        }
    }

    fn release(&mut self) {
        if self.phase == SessionPhase::AwaitingPlan {
            self.phase = SessionPhase::Idle;
        }
    }
}

/// The planner URL for one session: the base endpoint with the session
/// identifier appended as the last path segment.
pub fn session_url(base: &str, id: SessionId) -> String {
    format!("{}/{id}", base.trim_end_matches('/'))
}
