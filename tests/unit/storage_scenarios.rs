use chrono::{Duration, TimeZone, Utc};

use testflow::FlowError;
use testflow::flow::{
    InstallationDetails, ManualClock, ResultData, StepCatalog, Technician, TestFlowEngine,
    TestOutcome,
};
use testflow::test_utils::fixtures::UnitTestFixture;

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 11, 4, 13, 15, 0).unwrap())
}

#[test]
fn saved_state_restores_equivalent_engine() {
    let fixture = UnitTestFixture::new();
    let store = fixture.store();

    let mut engine = TestFlowEngine::new(StepCatalog::builtin("minor-works").unwrap())
        .with_clock(clock());
    engine
        .start_session(
            InstallationDetails {
                address: Some("4 Quay Street".into()),
                ..InstallationDetails::default()
            },
            Technician::new("M. Faraday"),
        )
        .unwrap();
    engine
        .record_result(
            "safe-isolation",
            ResultData::new(TestOutcome::Pass).with_notes("locked off at DB1"),
        )
        .unwrap();
    engine.go_to_step("polarity").unwrap();
    store.save_state(&engine.snapshot()).unwrap();

    let restored = TestFlowEngine::from_state(store.load_state().unwrap().unwrap()).unwrap();
    assert_eq!(restored.snapshot(), engine.snapshot());
    assert_eq!(restored.current_step().id, "polarity");
    assert_eq!(restored.completed_steps().len(), 1);
    assert_eq!(
        restored.session().unwrap().installation_details.address.as_deref(),
        Some("4 Quay Street")
    );
}

#[test]
fn archived_sessions_list_newest_first() {
    let fixture = UnitTestFixture::new();
    let store = fixture.store();
    let clock = clock();
    let mut engine =
        TestFlowEngine::new(StepCatalog::builtin("eicr").unwrap()).with_clock(clock.clone());

    let mut ids = Vec::new();
    for _ in 0..2 {
        engine
            .start_session(InstallationDetails::default(), Technician::default())
            .unwrap();
        let done = engine.complete_session().unwrap();
        store.archive(&done).unwrap();
        ids.push(done.id);
        clock.advance(Duration::days(1));
    }

    let listed: Vec<_> = store
        .list_archived()
        .unwrap()
        .into_iter()
        .map(|summary| summary.id)
        .collect();
    assert_eq!(listed, [ids[1].clone(), ids[0].clone()]);
    assert_eq!(store.load_archived(&ids[0]).unwrap().id, ids[0]);
}

#[test]
fn unknown_archive_id_is_not_found() {
    let fixture = UnitTestFixture::new();
    let err = fixture.store().load_archived("../state").unwrap_err();
    assert!(matches!(err, FlowError::NotFound(_)));
}

#[test]
fn missing_state_loads_as_none() {
    let fixture = UnitTestFixture::new();
    let store = fixture.store();
    assert!(store.load_state().unwrap().is_none());
    assert!(!store.clear_state().unwrap());
}
