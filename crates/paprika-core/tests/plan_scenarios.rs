//! End-to-end plan execution in the starting kitchen.
//!
//! Every scenario runs on the logical clock, so the multi-second timeouts
//! are exercised without sleeping.

#![allow(clippy::unwrap_used)]

use core::time::Duration;

use paprika_core::{AgentConfig, PlanError, PlanReport, Simulation, StepOutcome};
use paprika_types::{ActionArgs, ActionStatus, ActionStep, Plan, PlanResponse};
use paprika_world::{ItemContainer, Oven, Station, Vec3};

fn step(function: &str, target: &str) -> ActionStep {
    ActionStep::new(function, ActionArgs::new().with("id", target))
}

fn plan(task: &str, steps: Vec<ActionStep>) -> Plan {
    Plan {
        task: task.to_owned(),
        steps,
    }
}

fn kitchen(config: &AgentConfig) -> Simulation {
    Simulation::starting_kitchen(config).unwrap()
}

fn run(sim: &mut Simulation, plan: Plan) -> PlanReport {
    sim.start_plan(plan).unwrap();
    sim.run_for(Duration::from_secs(300)).unwrap().unwrap()
}

fn load_oven(sim: &mut Simulation, cook_time: Duration) {
    sim.world_mut()
        .with_station("Oven", |station| {
            let mut oven = Oven::new(&[("meat", "steak")], cook_time);
            oven.put_item("meat").unwrap();
            *station = Station::Oven(oven);
        })
        .unwrap();
}

#[test]
fn onion_goes_from_crate_to_plate() {
    let mut sim = kitchen(&AgentConfig::default());
    let report = run(
        &mut sim,
        plan(
            "serve sliced onion",
            vec![
                step("move_to", "OnionBox"),
                step("pickup", "OnionBox"),
                step("move_to", "PrepTable_2"),
                step("put_down", "CutBoard"),
                step("chop", "CutBoard"),
                step("pickup", "CutBoard"),
                step("move_to", "Plate"),
                step("put_down", "Plate"),
            ],
        ),
    );

    assert!(report.all_succeeded(), "{report:#?}");
    assert_eq!(report.steps.len(), 8);
    let state = sim.agent().state();
    assert!(state.held_item().is_none());
    assert_eq!(state.last_error(), Some("Put sliced_onion on Plate"));
    assert_eq!(
        sim.world().get("Plate").unwrap().state_label(),
        "holding:sliced_onion"
    );
    assert_eq!(
        sim.world().get("CutBoard").unwrap().state_label(),
        "empty"
    );
}

#[test]
fn every_step_is_dispatched_once_in_order() {
    let mut sim = kitchen(&AgentConfig::default());
    let report = run(
        &mut sim,
        plan(
            "mixed outcomes",
            vec![
                step("pickup", "Player"),
                step("put_down", "Plate"),
                ActionStep::new("wander", ActionArgs::new()),
                step("chop", "Oven"),
            ],
        ),
    );

    let indices: Vec<_> = report.steps.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    let functions: Vec<_> = report.steps.iter().map(|s| s.function.as_str()).collect();
    assert_eq!(functions, vec!["pickup", "put_down", "wander", "chop"]);
    let outcomes: Vec<_> = report.steps.iter().map(|s| s.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Reported(ActionStatus::Failure),
            StepOutcome::Reported(ActionStatus::Failure),
            StepOutcome::Reported(ActionStatus::Success),
            StepOutcome::Reported(ActionStatus::Failure),
        ]
    );
    for pair in report.steps.windows(2) {
        let (a, b) = (pair.first().unwrap(), pair.get(1).unwrap());
        assert!(b.dispatched_at >= a.finished_at.saturating_add(Duration::from_millis(500)));
    }
}

#[test]
fn second_plan_is_rejected_while_busy() {
    let mut sim = kitchen(&AgentConfig::default());
    sim.start_plan(plan("first", vec![step("move_to", "Oven")]))
        .unwrap();
    sim.step().unwrap();
    assert!(sim.agent().state().is_busy());

    let err = sim
        .start_plan(plan("second", vec![step("move_to", "Plate")]))
        .unwrap_err();
    assert_eq!(
        err,
        PlanError::Busy {
            task: "first".to_owned()
        }
    );

    let report = sim.run_for(Duration::from_secs(60)).unwrap().unwrap();
    assert_eq!(report.task, "first");
    assert!(!sim.agent().state().is_busy());
    sim.start_plan(plan("second", vec![])).unwrap();
}

#[test]
fn unknown_action_costs_exactly_one_step_timeout() {
    let mut sim = kitchen(&AgentConfig::default());
    let report = run(
        &mut sim,
        plan(
            "dance",
            vec![step("juggle", "Plate"), step("move_to", "Plate")],
        ),
    );

    let unknown = report.steps.first().unwrap();
    assert_eq!(unknown.outcome, StepOutcome::UnknownAction);
    assert_eq!(unknown.duration(), Duration::from_secs(30));
    assert_eq!(
        report.steps.get(1).unwrap().outcome,
        StepOutcome::Reported(ActionStatus::Success)
    );
}

#[test]
fn cooking_reports_ready_and_leaves_food_in_oven() {
    let mut sim = kitchen(&AgentConfig::default());
    load_oven(&mut sim, Duration::from_secs(8));
    let report = run(
        &mut sim,
        plan("cook steak", vec![step("move_to", "Oven"), step("cook", "Oven")]),
    );

    assert!(report.all_succeeded(), "{report:#?}");
    assert_eq!(sim.agent().state().last_error(), Some("Food is Ready"));
    assert_eq!(sim.world().get("Oven").unwrap().state_label(), "ready");
    assert!(sim.agent().state().held_item().is_none());
}

#[test]
fn cook_timeout_within_step_timeout_fails_cleanly() {
    let mut sim = kitchen(&AgentConfig::default());
    load_oven(&mut sim, Duration::from_secs(120));
    let report = run(
        &mut sim,
        plan("slow oven", vec![step("move_to", "Oven"), step("cook", "Oven")]),
    );

    let cook = report.steps.get(1).unwrap();
    assert_eq!(cook.outcome, StepOutcome::Reported(ActionStatus::Failure));
    assert_eq!(cook.duration(), Duration::from_secs(20));
    assert_eq!(sim.agent().state().last_error(), Some("Cooking Timed out"));
}

#[test]
fn cook_timeout_beyond_step_timeout_is_forced_and_late_report_dropped() {
    let mut config = AgentConfig::default();
    config.actions.cook_timeout_ms = 45_000;
    let mut sim = kitchen(&config);
    load_oven(&mut sim, Duration::from_secs(120));
    let report = run(
        &mut sim,
        plan(
            "slow oven",
            vec![
                step("move_to", "Oven"),
                step("cook", "Oven"),
                step("move_to", "Plate"),
            ],
        ),
    );

    let cook = report.steps.get(1).unwrap();
    assert_eq!(cook.outcome, StepOutcome::TimedOut);
    assert_eq!(cook.duration(), Duration::from_secs(30));
    assert_eq!(
        report.steps.get(2).unwrap().outcome,
        StepOutcome::Reported(ActionStatus::Success)
    );

    // Outlive the abandoned handler's own 45s timeout.
    assert!(sim.run_for(Duration::from_secs(30)).unwrap().is_none());
    let state = sim.agent().state();
    assert!(!state.is_busy());
    assert_eq!(state.last_status(), ActionStatus::Success);
    assert_eq!(state.last_error(), Some("Arrived at Plate"));
}

fn walk_to(x: f64, z: f64) -> ActionStep {
    ActionStep::new("move_to", ActionArgs::new().with("x", x).with("z", z))
}

#[test]
fn forced_walk_does_not_steer_the_next_step() {
    let mut config = AgentConfig::default();
    config.executor.step_timeout_ms = 3_000;
    config.actions.navigate_timeout_ms = 4_000;
    let mut sim = kitchen(&config);
    // The first walk is cut off at 3s and keeps ticking in the background
    // while the second walk is under way.
    let report = run(
        &mut sim,
        plan("back and forth", vec![walk_to(12.0, 1.0), walk_to(4.0, 1.0)]),
    );

    assert_eq!(report.steps.first().unwrap().outcome, StepOutcome::TimedOut);
    let second = report.steps.get(1).unwrap();
    assert_eq!(second.outcome, StepOutcome::Reported(ActionStatus::Success));
    assert!(second.finished_at > Duration::from_millis(4_100));
    assert!(
        sim.agent().position().distance(Vec3::new(4.0, 0.0, 1.0)) <= 0.1,
        "{:?}",
        sim.agent().position()
    );

    assert!(sim.run_for(Duration::from_secs(5)).unwrap().is_none());
    assert!(sim.agent().position().distance(Vec3::new(4.0, 0.0, 1.0)) <= 0.1);
    assert!(!sim.agent().state().is_busy());
}

#[test]
fn empty_response_never_reaches_the_executor() {
    let response = PlanResponse::parse(r#"{"client_id": "abc", "task": "idle", "plan": []}"#)
        .unwrap();
    assert!(response.into_plan().is_none());

    let mut sim = kitchen(&AgentConfig::default());
    sim.start_plan(plan("nothing", vec![])).unwrap();
    let report = sim.step().unwrap().unwrap();
    assert!(report.steps.is_empty());
    assert!(!sim.agent().is_executing());
}

#[test]
fn prefix_target_walks_to_nearest_free_table() {
    let mut sim = kitchen(&AgentConfig::default());
    sim.world_mut()
        .with_station("PrepTable_3", |station| {
            station.container_mut().unwrap().put_item("tomato").unwrap();
        })
        .unwrap();

    let report = run(&mut sim, plan("find a table", vec![step("move_to", "PrepTable")]));
    assert!(report.all_succeeded());
    assert_eq!(
        sim.agent().state().last_error(),
        Some("Arrived at PrepTable_2")
    );
    assert!(sim.agent().position().distance(Vec3::new(-2.0, 0.0, -1.0)) <= 0.1);
}

#[test]
fn perception_follows_the_agent() {
    let mut sim = kitchen(&AgentConfig::default());
    run(&mut sim, plan("to the oven", vec![step("move_to", "Oven")]));
    let perception = sim.perceive(12);
    assert_eq!(perception.location_id, "Kitchen");
    assert_eq!(perception.last_action_status, ActionStatus::Success);
    assert_eq!(perception.nearby_objects.first().unwrap().id, "Oven");
}
