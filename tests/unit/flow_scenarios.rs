use chrono::{Duration, TimeZone, Utc};

use testflow::FlowError;
use testflow::flow::{
    Clock, EventLog, InstallationDetails, ManualClock, Navigation, ResultData, SessionStatus, StepCatalog,
    StepDefinition, Technician, TestFlowEngine, TestOutcome,
};
use testflow::test_utils::logging::TestLogger;

fn three_steps() -> StepCatalog {
    let steps = (1..=3)
        .map(|n| StepDefinition::new(format!("step-{n}"), format!("Step {n}")))
        .collect();
    StepCatalog::new("scenario", "Scenario flow", steps).unwrap()
}

fn engine() -> (TestFlowEngine, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
    let engine = TestFlowEngine::new(three_steps()).with_clock(clock.clone());
    (engine, clock)
}

#[test]
fn complete_without_session_is_refused() {
    let (mut engine, _) = engine();
    assert!(matches!(
        engine.complete_session(),
        Err(FlowError::NoActiveSession)
    ));
}

#[test]
fn completed_session_has_end_time() {
    let (mut engine, clock) = engine();
    engine
        .start_session(InstallationDetails::default(), Technician::new("R. Ohm"))
        .unwrap();
    clock.advance(Duration::minutes(90));
    let done = engine.complete_session().unwrap();
    assert_eq!(done.status, SessionStatus::Completed);
    assert_eq!(done.end_time, Some(clock.now()));
    assert_eq!(done.duration(clock.now()), Duration::minutes(90));
}

#[test]
fn start_record_next_complete() {
    let mut logger = TestLogger::new("start_record_next_complete");
    let (mut engine, _) = engine();
    let log = EventLog::new();
    engine.add_observer(log.clone());

    logger.step("start session");
    engine
        .start_session(InstallationDetails::default(), Technician::new("R. Ohm"))
        .unwrap();
    logger.step("record step-1");
    engine
        .record_result("step-1", ResultData::new(TestOutcome::Pass))
        .unwrap();
    logger.step("advance and complete");
    engine.next_step().unwrap();
    let done = engine.complete_session().unwrap();
    logger.log_actual(&done.status);

    assert_eq!(done.status, SessionStatus::Completed);
    assert_eq!(done.results.len(), 1);
    assert!(done.end_time.is_some());
    assert_eq!(done.current_step_index, 1);
    assert_eq!(engine.current_step_index(), 1);

    let titles: Vec<_> = log.notifications().into_iter().map(|n| n.title).collect();
    assert_eq!(
        titles,
        ["Test Session Started", "Result Recorded", "Test Session Completed"]
    );
    logger.pass();
}

#[test]
fn previous_right_after_start_stays_at_first_step() {
    let (mut engine, _) = engine();
    engine
        .start_session(InstallationDetails::default(), Technician::default())
        .unwrap();
    assert_eq!(
        engine.previous_step().unwrap(),
        Navigation::AtBoundary { index: 0 }
    );
    assert_eq!(engine.current_step_index(), 0);
    assert!(engine.is_first_step());
}

#[test]
fn navigation_without_session_moves_cursor_only() {
    let (mut engine, _) = engine();
    assert!(engine.next_step().unwrap().moved());
    assert_eq!(engine.current_step().id, "step-2");
    assert!(engine.session().is_none());
}

#[test]
fn builtin_flow_assesses_readings() {
    let catalog = StepCatalog::builtin("eicr").unwrap();
    let insulation = catalog.step("insulation-resistance").unwrap();
    assert_eq!(insulation.assess(0.4), Some(TestOutcome::Fail));
    assert_eq!(insulation.assess(299.0), Some(TestOutcome::Pass));
    assert_eq!(catalog.step("polarity").unwrap().assess(1.0), None);
}

#[test]
fn progress_tracks_cursor() {
    let (mut engine, _) = engine();
    engine
        .start_session(InstallationDetails::default(), Technician::default())
        .unwrap();
    let start = engine.progress();
    engine.go_to_step("step-3").unwrap();
    assert!(engine.progress() > start);
    assert!(engine.is_last_step());
}
