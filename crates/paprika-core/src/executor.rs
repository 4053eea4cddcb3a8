//! Plan executor.
//!
//! Drives one plan step by step with at most one action in flight. Each
//! step moves through three phases, all advanced by [`PlanExecutor::tick`]:
//!
//! 1. **Dispatch** -- mark the agent busy, then hand the step to the
//!    registry. The busy flag is set first so a handler that finishes on
//!    its very first tick can never be missed.
//! 2. **Waiting** -- tick the in-flight task and watch the busy flag. If
//!    the step holds it past the configured timeout, the executor forces
//!    the agent idle and moves on. The abandoned task keeps running in the
//!    background; its late report carries a stale ticket and is dropped.
//! 3. **Pacing** -- a short pause before the next step.
//!
//! A plan is never aborted because one step failed or timed out. `tick`
//! returns the [`PlanReport`] on the frame the last step ends; no pacing
//! follows it.
//!
//! A task left behind by a forced advance or an abandoned plan is
//! detached: it still ticks until it reports, but no longer steers the
//! body. The body is stopped when the task is cut off.

use core::time::Duration;

use paprika_agents::{ActionRegistry, AgentContext, AgentState, InFlightAction};
use paprika_types::{ActionStatus, ActionStep, Plan};
use paprika_world::Navigator;
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;

/// Errors raised when handing a plan to the executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A plan is already executing.
    #[error("executor is busy with task '{task}'")]
    Busy {
        /// The task that is still executing.
        task: String,
    },
}

/// How a dispatched step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The handler reported a terminal status.
    Reported(ActionStatus),
    /// The handler did not report in time and the executor moved on.
    TimedOut,
    /// No handler serves the step's function.
    UnknownAction,
}

/// Summary of one dispatched step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Position in the plan.
    pub index: usize,
    /// The requested action name.
    pub function: String,
    /// How the step ended.
    pub outcome: StepOutcome,
    /// Simulated time of dispatch.
    pub dispatched_at: Duration,
    /// Simulated time the executor stopped waiting.
    pub finished_at: Duration,
}

impl StepRecord {
    /// How long the executor waited on this step.
    pub const fn duration(&self) -> Duration {
        self.finished_at.saturating_sub(self.dispatched_at)
    }
}

/// Returned when a plan finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    /// The plan's task label.
    pub task: String,
    /// Every dispatched step in order.
    pub steps: Vec<StepRecord>,
}

impl PlanReport {
    /// Whether every step reported success.
    pub fn all_succeeded(&self) -> bool {
        self.steps
            .iter()
            .all(|s| s.outcome == StepOutcome::Reported(ActionStatus::Success))
    }
}

/// Receives each step's rationale as it is dispatched.
pub trait ThoughtSink {
    /// Called once per step, just before dispatch.
    fn thought(&mut self, index: usize, step: &ActionStep);
}

/// A [`ThoughtSink`] that writes rationales to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogThoughts;

impl ThoughtSink for LogThoughts {
    fn thought(&mut self, index: usize, step: &ActionStep) {
        if !step.rationale.is_empty() {
            info!(step = index, thought = %step.rationale, "agent thinking");
        }
    }
}

/// The step currently holding the busy flag.
#[derive(Debug)]
struct CurrentStep {
    index: usize,
    function: String,
    dispatched_at: Duration,
    /// `None` when the registry had no handler for the function.
    action: Option<InFlightAction>,
}

#[derive(Debug)]
enum Phase {
    Dispatch,
    Waiting(CurrentStep),
    Pacing { until: Duration },
}

#[derive(Debug)]
struct ActivePlan {
    plan: Plan,
    next: usize,
    phase: Phase,
    records: Vec<StepRecord>,
}

/// Executes one plan at a time.
#[derive(Debug)]
pub struct PlanExecutor {
    config: ExecutorConfig,
    active: Option<ActivePlan>,
    /// Tasks abandoned by a forced advance, still ticking until they finish.
    background: Vec<InFlightAction>,
}

impl PlanExecutor {
    /// An idle executor.
    pub const fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            active: None,
            background: Vec::new(),
        }
    }

    /// Begin executing `plan` on the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Busy`] if a plan is already executing.
    pub fn start(&mut self, plan: Plan) -> Result<(), PlanError> {
        if let Some(active) = &self.active {
            return Err(PlanError::Busy {
                task: active.plan.task.clone(),
            });
        }
        info!(task = %plan.task, steps = plan.len(), "plan accepted");
        self.active = Some(ActivePlan {
            plan,
            next: 0,
            phase: Phase::Dispatch,
            records: Vec::new(),
        });
        Ok(())
    }

    /// Whether a plan is executing.
    pub const fn is_executing(&self) -> bool {
        self.active.is_some()
    }

    /// Index of the step being executed, or of the next step while pacing.
    pub fn current_step(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.next)
    }

    /// Number of abandoned tasks still running.
    pub const fn background_len(&self) -> usize {
        self.background.len()
    }

    /// Drop the executing plan without waiting for it.
    ///
    /// A step still in flight keeps running in the background, detached
    /// from the body; the body stops and the agent is forced idle so the
    /// next plan can start.
    pub fn abandon(&mut self, state: &mut AgentState, navigator: &mut dyn Navigator) {
        let Some(active) = self.active.take() else {
            return;
        };
        warn!(task = %active.plan.task, step = active.next, "abandoning plan");
        if let Phase::Waiting(current) = active.phase {
            state.force_idle("Plan abandoned");
            if let Some(action) = current.action {
                self.detach(action, navigator);
            }
        }
    }

    /// Advance the executing plan by one tick.
    ///
    /// Returns the report on the frame the last step ends.
    pub fn tick(
        &mut self,
        ctx: &mut AgentContext<'_>,
        registry: &ActionRegistry,
        thoughts: &mut dyn ThoughtSink,
    ) -> Option<PlanReport> {
        self.poll_background(ctx);
        let mut active = self.active.take()?;
        let now = ctx.frame.now;

        loop {
            match core::mem::replace(&mut active.phase, Phase::Dispatch) {
                Phase::Dispatch => {
                    let Some(step) = active.plan.steps.get(active.next) else {
                        info!(
                            task = %active.plan.task,
                            steps = active.records.len(),
                            "plan finished"
                        );
                        return Some(PlanReport {
                            task: active.plan.task,
                            steps: active.records,
                        });
                    };
                    thoughts.thought(active.next, step);
                    let current = Self::dispatch(active.next, step, ctx, registry);
                    active.phase = Phase::Waiting(current);
                }
                Phase::Waiting(mut current) => {
                    let Some(outcome) = self.check_step(&mut current, ctx) else {
                        active.phase = Phase::Waiting(current);
                        break;
                    };
                    active.records.push(StepRecord {
                        index: current.index,
                        function: current.function,
                        outcome,
                        dispatched_at: current.dispatched_at,
                        finished_at: now,
                    });
                    if let Some(action) = current.action {
                        self.detach(action, &mut *ctx.navigator);
                    }
                    active.next = active.next.saturating_add(1);
                    if active.next < active.plan.len() {
                        active.phase = Phase::Pacing {
                            until: now.saturating_add(self.config.step_pacing()),
                        };
                    }
                }
                Phase::Pacing { until } => {
                    if now < until {
                        active.phase = Phase::Pacing { until };
                        break;
                    }
                }
            }
        }

        self.active = Some(active);
        None
    }

    fn dispatch(
        index: usize,
        step: &ActionStep,
        ctx: &mut AgentContext<'_>,
        registry: &ActionRegistry,
    ) -> CurrentStep {
        let ticket = ctx.state.begin_action();
        info!(step = index, function = %step.function, %ticket, "dispatching plan step");
        let action = registry
            .dispatch(&step.function, &step.args)
            .map(|(name, task)| InFlightAction::new(ticket, name, task));
        CurrentStep {
            index,
            function: step.function.clone(),
            dispatched_at: ctx.frame.now,
            action,
        }
    }

    /// Tick the step's task and decide whether the executor may move on.
    fn check_step(
        &self,
        current: &mut CurrentStep,
        ctx: &mut AgentContext<'_>,
    ) -> Option<StepOutcome> {
        if let Some(action) = current.action.as_mut() {
            action.poll(ctx);
        }
        if !ctx.state.is_busy() {
            return Some(StepOutcome::Reported(ctx.state.last_status()));
        }

        let timeout = self.config.step_timeout();
        let waited = ctx.frame.now.saturating_sub(current.dispatched_at);
        if waited < timeout {
            return None;
        }

        let (outcome, message) = if current.action.is_some() {
            (
                StepOutcome::TimedOut,
                format!(
                    "Action {} did not finish within {}s",
                    current.function,
                    timeout.as_secs()
                ),
            )
        } else {
            (
                StepOutcome::UnknownAction,
                format!("Unknown action '{}'", current.function),
            )
        };
        warn!(
            step = current.index,
            function = %current.function,
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "step timed out, forcing advance"
        );
        ctx.state.force_idle(&message);
        Some(outcome)
    }

    /// Move an unfinished task to the background and stop the body it was
    /// steering.
    fn detach(&mut self, mut action: InFlightAction, navigator: &mut dyn Navigator) {
        if action.is_finished() {
            return;
        }
        debug!(action = %action.name(), ticket = %action.ticket(), "detaching unfinished action");
        navigator.stop();
        action.detach();
        self.background.push(action);
    }

    fn poll_background(&mut self, ctx: &mut AgentContext<'_>) {
        if self.background.is_empty() {
            return;
        }
        self.background.retain_mut(|action| !action.poll(ctx));
        debug!(remaining = self.background.len(), "polled abandoned actions");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use paprika_agents::{
        ActionHandler, ActionName, ActionSettings, ActionTask, Frame, HandlerStatus,
        ResourceArbiter,
    };
    use paprika_types::ActionArgs;
    use paprika_world::{FloorPlan, KinematicNavigator, Vec3, World};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const TICK: Duration = Duration::from_millis(50);

    /// Finishes after a fixed number of ticks.
    struct Timed {
        remaining: f64,
        status: HandlerStatus,
    }

    impl ActionTask for Timed {
        fn tick(&mut self, _ctx: &mut AgentContext<'_>) -> HandlerStatus {
            if self.remaining <= 0.0 {
                return self.status.clone();
            }
            self.remaining -= 1.0;
            HandlerStatus::Running
        }
    }

    /// Handler whose duration and outcome come from the step args.
    struct Scripted(ActionName);

    impl ActionHandler for Scripted {
        fn name(&self) -> ActionName {
            self.0
        }

        fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
            let remaining = args.number("ticks").ok().flatten().unwrap_or(0.0);
            let fail = args.text("fail").ok().flatten().is_some();
            let status = if fail {
                HandlerStatus::failed("scripted failure")
            } else {
                HandlerStatus::succeeded("scripted success")
            };
            Box::new(Timed { remaining, status })
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<(usize, String)>);

    impl ThoughtSink for Recorder {
        fn thought(&mut self, index: usize, step: &ActionStep) {
            self.0.push((index, step.rationale.clone()));
        }
    }

    struct Harness {
        state: AgentState,
        world: World,
        navigator: KinematicNavigator,
        floor: FloorPlan,
        rng: StdRng,
        arbiter: ResourceArbiter,
        settings: ActionSettings,
        frame: Frame,
        registry: ActionRegistry,
        thoughts: Recorder,
        executor: PlanExecutor,
    }

    impl Harness {
        fn new() -> Self {
            let mut registry = ActionRegistry::new();
            registry.register(Box::new(Scripted(ActionName::Chop))).unwrap();
            Self {
                state: AgentState::new(),
                world: World::new(),
                navigator: KinematicNavigator::new(Vec3::ZERO),
                floor: FloorPlan::new(0.0),
                rng: StdRng::seed_from_u64(1),
                arbiter: ResourceArbiter::default(),
                settings: ActionSettings::default(),
                frame: Frame::default(),
                registry,
                thoughts: Recorder::default(),
                executor: PlanExecutor::new(ExecutorConfig::default()),
            }
        }

        fn tick(&mut self) -> Option<PlanReport> {
            self.frame.tick = self.frame.tick.saturating_add(1);
            self.frame.now = self.frame.now.saturating_add(TICK);
            self.frame.dt = TICK;
            let mut ctx = AgentContext {
                agent: "Chef",
                state: &mut self.state,
                world: &mut self.world,
                navigator: &mut self.navigator,
                walkable: &self.floor,
                rng: &mut self.rng,
                arbiter: &self.arbiter,
                settings: &self.settings,
                frame: self.frame,
            };
            self.executor
                .tick(&mut ctx, &self.registry, &mut self.thoughts)
        }

        fn run(&mut self, limit: u32) -> Option<PlanReport> {
            (0..limit).find_map(|_| self.tick())
        }
    }

    fn step(function: &str, ticks: f64) -> ActionStep {
        let mut step = ActionStep::new(function, ActionArgs::new().with("ticks", ticks));
        step.rationale = format!("do {function}");
        step
    }

    fn plan(steps: Vec<ActionStep>) -> Plan {
        Plan {
            task: "test".to_owned(),
            steps,
        }
    }

    #[test]
    fn busy_executor_rejects_second_plan() {
        let mut h = Harness::new();
        h.executor.start(plan(vec![step("chop", 5.0)])).unwrap();
        let err = h.executor.start(plan(vec![])).unwrap_err();
        assert_eq!(
            err,
            PlanError::Busy {
                task: "test".to_owned()
            }
        );
    }

    #[test]
    fn immediate_handler_is_not_missed() {
        let mut h = Harness::new();
        h.executor.start(plan(vec![step("chop", 0.0)])).unwrap();
        let report = h.tick().unwrap();
        assert_eq!(
            report.steps.first().unwrap().outcome,
            StepOutcome::Reported(ActionStatus::Success)
        );
        assert!(!h.state.is_busy());
        assert_eq!(h.state.last_status(), ActionStatus::Success);
    }

    #[test]
    fn steps_run_in_order_with_pacing() {
        let mut h = Harness::new();
        h.executor
            .start(plan(vec![step("chop", 2.0), step("chop", 0.0)]))
            .unwrap();
        let report = h.run(200).unwrap();
        assert_eq!(report.steps.len(), 2);
        assert!(report.all_succeeded());
        let first = report.steps.first().unwrap();
        let second = report.steps.get(1).unwrap();
        assert_eq!(first.duration(), Duration::from_millis(100));
        // Second dispatch waits out the pacing after the first.
        assert_eq!(
            second.dispatched_at.saturating_sub(first.finished_at),
            Duration::from_millis(500)
        );
        assert_eq!(
            h.thoughts.0,
            vec![(0, "do chop".to_owned()), (1, "do chop".to_owned())]
        );
        // No pause after the last step.
        assert_eq!(second.finished_at, h.frame.now);
        assert!(!h.executor.is_executing());
    }

    #[test]
    fn current_step_moves_on_while_pacing() {
        let mut h = Harness::new();
        h.executor
            .start(plan(vec![step("chop", 0.0), step("chop", 5.0)]))
            .unwrap();
        assert_eq!(h.executor.current_step(), Some(0));
        assert!(h.tick().is_none());
        assert_eq!(h.executor.current_step(), Some(1));
        assert!(!h.state.is_busy());
    }

    #[test]
    fn failed_step_does_not_abort_plan() {
        let mut h = Harness::new();
        let failing = ActionStep::new("chop", ActionArgs::new().with("fail", "yes"));
        h.executor
            .start(plan(vec![failing, step("chop", 0.0)]))
            .unwrap();
        let report = h.run(200).unwrap();
        let outcomes: Vec<_> = report.steps.iter().map(|s| s.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                StepOutcome::Reported(ActionStatus::Failure),
                StepOutcome::Reported(ActionStatus::Success),
            ]
        );
    }

    #[test]
    fn unknown_action_waits_full_timeout() {
        let mut h = Harness::new();
        h.executor.start(plan(vec![step("juggle", 0.0)])).unwrap();
        let report = h.run(2000).unwrap();
        let record = report.steps.first().unwrap();
        assert_eq!(record.outcome, StepOutcome::UnknownAction);
        assert_eq!(record.duration(), Duration::from_secs(30));
        assert_eq!(h.state.last_status(), ActionStatus::Failure);
        assert_eq!(h.state.last_error(), Some("Unknown action 'juggle'"));
    }

    #[test]
    fn slow_step_is_forced_and_late_report_ignored() {
        let mut h = Harness::new();
        // 700 ticks of 50ms is 35s, past the 30s step timeout.
        h.executor
            .start(plan(vec![step("chop", 700.0), step("chop", 1.0)]))
            .unwrap();
        let report = h.run(2000).unwrap();
        assert_eq!(
            report.steps.first().unwrap().outcome,
            StepOutcome::TimedOut
        );
        assert_eq!(
            report.steps.get(1).unwrap().outcome,
            StepOutcome::Reported(ActionStatus::Success)
        );
        assert_eq!(h.executor.background_len(), 1);

        for _ in 0..200 {
            h.tick();
        }
        assert_eq!(h.executor.background_len(), 0);
        assert_eq!(h.state.last_status(), ActionStatus::Success);
        assert_eq!(h.state.last_error(), Some("scripted success"));
    }

    #[test]
    fn empty_plan_finishes_on_first_tick() {
        let mut h = Harness::new();
        h.executor.start(plan(vec![])).unwrap();
        let report = h.tick().unwrap();
        assert!(report.steps.is_empty());
        assert!(!h.executor.is_executing());
    }

    #[test]
    fn abandon_frees_the_agent() {
        let mut h = Harness::new();
        h.executor.start(plan(vec![step("chop", 100.0)])).unwrap();
        h.tick();
        assert!(h.state.is_busy());
        h.executor.abandon(&mut h.state, &mut h.navigator);
        assert!(!h.state.is_busy());
        assert!(!h.executor.is_executing());
        assert_eq!(h.executor.background_len(), 1);
        h.executor.start(plan(vec![])).unwrap();
    }

    #[test]
    fn abandon_stops_the_body() {
        let mut h = Harness::new();
        h.navigator.set_destination(Vec3::new(4.0, 0.0, 0.0));
        h.executor.start(plan(vec![step("chop", 100.0)])).unwrap();
        h.tick();
        h.executor.abandon(&mut h.state, &mut h.navigator);
        assert_eq!(h.navigator.destination(), None);
        assert!(h.navigator.velocity().is_near_zero());
    }

    #[test]
    fn abandon_between_steps_leaves_the_body_alone() {
        let mut h = Harness::new();
        h.executor
            .start(plan(vec![step("chop", 0.0), step("chop", 0.0)]))
            .unwrap();
        h.tick();
        let destination = Vec3::new(4.0, 0.0, 0.0);
        h.navigator.set_destination(destination);
        h.executor.abandon(&mut h.state, &mut h.navigator);
        assert_eq!(h.navigator.destination(), Some(destination));
        assert_eq!(h.executor.background_len(), 0);
    }
}
