use junction_dashboard::communication::DashboardCommand;
use junction_dashboard::control_system::recommendation::{default_recommendation, Decision};
use junction_dashboard::control_system::signal_phase_engine::{PhaseTimings, SignalPhaseEngine};
use junction_dashboard::monitoring::incidents::seed_incidents;
use junction_dashboard::monitoring::{DashboardController, Resolution};
use junction_dashboard::simulation_engine::junctions::{
    Coordinates, Junction, JunctionId, JunctionStore, LightState, Phase, SignalState,
    TrafficMetrics,
};
use junction_dashboard::simulation_engine::perturbation::{
    RngSource, MAX_DENSITY, MIN_DENSITY, MIN_WAIT_TIME,
};

fn junction(id: &str, phase: Phase, time_left: u32) -> Junction {
    Junction::new(
        id,
        id,
        TrafficMetrics::new(50.0, 5, 30.0),
        phase,
        time_left,
        Coordinates::new(13.0, 80.2),
    )
}

fn engine_with(junctions: Vec<Junction>) -> SignalPhaseEngine {
    SignalPhaseEngine::new(JunctionStore::new(junctions), PhaseTimings::default())
}

fn demo(seed: u64) -> DashboardController {
    DashboardController::demo(PhaseTimings::default(), Box::new(RngSource::seeded(seed))).unwrap()
}

#[test]
fn green_runs_out_into_yellow() {
    let id = JunctionId::from("j1");
    let mut engine = engine_with(vec![junction("j1", Phase::NsGreen, 1)]);

    engine.tick();
    let j = engine.junction(&id).unwrap();
    assert_eq!((j.phase, j.time_left), (Phase::NsGreen, 0));

    engine.tick();
    let j = engine.junction(&id).unwrap();
    assert_eq!((j.phase, j.time_left), (Phase::NsYellow, 5));
    assert_eq!(
        j.signal_state,
        SignalState {
            ns: LightState::Yellow,
            ew: LightState::Red
        }
    );
}

#[test]
fn emergency_green_after_ew_red() {
    let id = JunctionId::from("j1");
    let mut engine = engine_with(vec![junction("j1", Phase::EwRed, 0)]);
    engine.set_emergency_mode(true);
    engine.tick();
    let j = engine.junction(&id).unwrap();
    assert_eq!((j.phase, j.time_left), (Phase::NsGreen, 60));
}

#[test]
fn cycle_returns_to_start_after_six_changes() {
    let id = JunctionId::from("j1");
    let mut engine = engine_with(vec![junction("j1", Phase::NsGreen, 0)]);
    let mut seen = Vec::new();
    while seen.len() < 6 {
        let before = engine.junction(&id).unwrap().phase;
        engine.tick();
        let j = engine.junction(&id).unwrap();
        assert_eq!(j.signal_state, j.phase.signal_state());
        if j.phase != before {
            seen.push(j.phase);
        }
    }
    assert_eq!(
        seen,
        vec![
            Phase::NsYellow,
            Phase::NsRed,
            Phase::EwGreen,
            Phase::EwYellow,
            Phase::EwRed,
            Phase::NsGreen
        ]
    );
}

#[test]
fn manual_override_freezes_every_junction() {
    let mut dash = demo(11);
    dash.toggle_manual_override();
    let frozen: Vec<(Phase, u32)> = dash
        .engine()
        .junctions()
        .iter()
        .map(|j| (j.phase, j.time_left))
        .collect();
    for _ in 0..50 {
        dash.tick();
    }
    let after: Vec<(Phase, u32)> = dash
        .engine()
        .junctions()
        .iter()
        .map(|j| (j.phase, j.time_left))
        .collect();
    assert_eq!(after, frozen);
}

#[test]
fn clearing_the_ambulance_preempts_omr() {
    let mut dash = demo(3);
    let resolution = dash.resolve_incident(1, "Clear traffic signal").unwrap();
    assert_eq!(resolution, Resolution::Resolved);

    let incident = dash.incidents().get(1).unwrap().clone();
    assert!(incident.resolved);
    assert_eq!(incident.resolved_action.as_deref(), Some("Clear traffic signal"));

    let omr = dash
        .engine()
        .junction(&JunctionId::from("omr-sholinganallur"))
        .unwrap();
    assert_eq!((omr.phase, omr.time_left), (Phase::NsGreen, 60));
    assert!(dash.emergency_mode());

    // Same id again keeps the first resolution.
    assert_eq!(
        dash.resolve_incident(1, "Contact emergency services").unwrap(),
        Resolution::AlreadyResolved
    );
    let again = dash.incidents().get(1).unwrap();
    assert_eq!(again.resolved_action, incident.resolved_action);
    assert_eq!(again.resolved_time, incident.resolved_time);
}

#[test]
fn unknown_junction_keeps_selection() {
    let mut dash = demo(5);
    let before = dash.selected_junction().clone();
    let err = dash
        .dispatch(DashboardCommand::SelectJunction {
            junction_id: JunctionId::from("unknown-id"),
        })
        .unwrap_err();
    assert!(err.is_invalid_reference());
    assert_eq!(dash.selected_junction(), &before);
}

#[test]
fn recommendation_decides_once() {
    let mut dash = demo(8);
    dash.dispatch(DashboardCommand::DeclineRecommendation).unwrap();
    let snapshot = dash.snapshot();
    assert!(dash.dispatch(DashboardCommand::AcceptRecommendation).is_err());
    assert_eq!(dash.recommendation().decision(), Decision::Declined);
    assert_eq!(dash.snapshot(), snapshot);

    let mut standalone = default_recommendation();
    standalone.accept().unwrap();
    assert!(standalone.accept().is_err());
    assert_eq!(standalone.decision(), Decision::Accepted);
}

#[test]
fn long_run_keeps_traffic_in_bounds() {
    let mut dash = DashboardController::new(
        JunctionStore::new(vec![junction("edge", Phase::NsGreen, 3)]),
        seed_incidents(chrono::Local::now()),
        default_recommendation(),
        PhaseTimings::default(),
        Box::new(RngSource::seeded(42)),
    )
    .unwrap()
    .with_perturbation_every(1);
    for _ in 0..2_000 {
        dash.tick();
        let snapshot = dash.snapshot();
        let j = snapshot.selected().unwrap();
        assert!((MIN_DENSITY..=MAX_DENSITY).contains(&j.density));
        assert!(j.wait_time >= MIN_WAIT_TIME);
        assert_eq!(j.signal_state, j.phase.signal_state());
    }
}

#[test]
fn commands_decode_from_json() {
    let command: DashboardCommand =
        serde_json::from_str(r#"{"command":"resolve_incident","incident_id":1,"action":"Clear traffic signal"}"#)
            .unwrap();
    let mut dash = demo(9);
    dash.dispatch(command).unwrap();
    assert!(dash.snapshot().active_incidents.is_empty());
}
