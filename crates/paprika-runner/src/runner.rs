//! The session runner: one agent, one planner connection, one tick loop.
//!
//! Each frame the runner:
//! 1. Drains the planner messages queued since the last frame
//! 2. Starts any accepted plan on the agent
//! 3. Advances the simulation by one tick
//! 4. Releases the thinking gate if the plan just finished
//! 5. Sends a perception snapshot if the session cadence allows it
//!
//! When the connection drops, the executing plan is abandoned and, if
//! auto-reconnect is enabled, a new session is opened after a backoff.

use std::time::Instant;

use paprika_core::{AgentConfig, SessionConfig, Simulation, wall_clock_hour};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::connection::{Connection, Event};
use crate::error::RunnerError;
use crate::session::{Inbound, Session, session_url};

/// What one frame produced for the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutput {
    /// A perception snapshot to send.
    pub outgoing: Option<String>,
    /// The planner closed the connection.
    pub closed: bool,
}

/// Drives one agent against the planner.
#[derive(Debug)]
pub struct SessionRunner {
    config: SessionConfig,
    sim: Simulation,
    session: Session,
    backoff: Backoff,
}

impl SessionRunner {
    /// A runner for a fresh agent in the starting kitchen.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Core`] if the simulation cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, RunnerError> {
        let sim = Simulation::starting_kitchen(config)?;
        let session = &config.session;
        Ok(Self {
            config: session.clone(),
            sim,
            session: Session::new(session.perception_interval()),
            backoff: Backoff::new(
                session.reconnect_initial_backoff(),
                session.reconnect_max_backoff(),
            ),
        })
    }

    /// Connect and run until the connection ends for good.
    ///
    /// Transport failures end the current session only. Simulation
    /// failures are fatal.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Core`] or [`RunnerError::Serde`] if the agent
    /// itself cannot continue.
    pub async fn run(&mut self) -> Result<(), RunnerError> {
        loop {
            let id = self.session.begin_connect();
            let url = session_url(&self.config.server_url, id);
            let started = Instant::now();

            match Connection::open(&url).await {
                Ok(connection) => {
                    self.session.on_open(self.sim.clock().now());
                    match self.drive(connection).await {
                        Ok(()) | Err(RunnerError::Transport(_)) => {}
                        Err(fatal) => {
                            self.disconnect();
                            return Err(fatal);
                        }
                    }
                }
                Err(e) => warn!(session_id = %id, error = %e, "planner connection failed"),
            }
            self.disconnect();

            if !self.config.auto_reconnect {
                info!("auto reconnect disabled, runner stopping");
                return Ok(());
            }
            let ran_for = started.elapsed();
            if ran_for >= self.config.stable_connection() {
                self.backoff.reset();
            }
            let delay = self.backoff.next_delay();
            warn!(
                backoff_ms = delay.as_millis(),
                ran_for_ms = ran_for.as_millis(),
                "planner session ended, reconnecting"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn drive(&mut self, mut connection: Connection) -> Result<(), RunnerError> {
        let result = self.pump(&mut connection).await;
        if let Err(e) = &result {
            warn!(
                session_id = ?self.session.session_id(),
                phase = ?self.session.phase(),
                error = %e,
                "planner session failed"
            );
        }
        connection.close().await;
        result
    }

    async fn pump(&mut self, connection: &mut Connection) -> Result<(), RunnerError> {
        let mut ticker = tokio::time::interval(self.sim.clock().interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let output = self.frame(connection.drain())?;
            if let Some(text) = output.outgoing {
                connection.send(text).await?;
                self.session.perception_sent();
            }
            if output.closed {
                return Ok(());
            }
        }
    }

    /// Run one frame against the queued planner events.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Core`] if the clock overflows, or
    /// [`RunnerError::Serde`] if the snapshot cannot be encoded.
    pub fn frame(&mut self, events: Vec<Event>) -> Result<FrameOutput, RunnerError> {
        for event in events {
            match event {
                Event::Text(text) => self.handle_message(&text),
                Event::Closed(reason) => {
                    info!(session_id = ?self.session.session_id(), reason = ?reason, "planner closed the connection");
                    return Ok(FrameOutput {
                        outgoing: None,
                        closed: true,
                    });
                }
            }
        }

        if let Some(report) = self.sim.step()? {
            info!(
                task = %report.task,
                steps = report.steps.len(),
                all_succeeded = report.all_succeeded(),
                "plan finished"
            );
            self.session.on_plan_finished();
        }

        let outgoing = if self.session.poll_perception(self.sim.clock().now()) {
            let perception = self.sim.perceive(wall_clock_hour());
            Some(serde_json::to_string(&perception)?)
        } else {
            None
        };
        Ok(FrameOutput {
            outgoing,
            closed: false,
        })
    }

    fn handle_message(&mut self, text: &str) {
        match self.session.on_message(text) {
            Inbound::PlanAccepted(plan) => {
                if let Err(e) = self.sim.start_plan(plan) {
                    warn!(error = %e, "plan rejected by executor");
                    self.session.on_plan_finished();
                }
            }
            Inbound::ProtocolError(reason) => {
                debug!(reason = %reason, "gate released after protocol error");
            }
            Inbound::NoTask | Inbound::Ignored => {}
        }
    }

    /// Drop the session and anything it started.
    fn disconnect(&mut self) {
        self.sim.agent_mut().abandon_plan();
        self.session.on_closed();
    }
}
