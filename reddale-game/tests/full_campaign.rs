use reddale_game::{
    EngineError, GamePhase, INITIAL_BUDGET, MAX_ROUNDS, Metrics, OutcomeKind, RoundEngine,
    ToggleOutcome, classify,
};

fn new_engine() -> RoundEngine {
    RoundEngine::with_default_catalog().unwrap()
}

fn play_round(engine: &mut RoundEngine, ids: &[&str]) {
    for id in ids {
        assert_eq!(
            engine.toggle_select(id).unwrap(),
            ToggleOutcome::Selected,
            "selecting {id}"
        );
    }
    engine.submit_round().unwrap();
}

#[test]
fn toggling_a_policy_debits_then_refunds_the_budget() {
    let mut engine = new_engine();
    assert_eq!(engine.state().budget, 100);
    engine.toggle_select("tech-jobs").unwrap();
    assert_eq!(engine.state().budget, 65);
    engine.toggle_select("tech-jobs").unwrap();
    assert_eq!(engine.state().budget, 100);
}

#[test]
fn brownfield_cleanup_unlocks_both_upgrades() {
    let mut engine = new_engine();
    let cleanup = engine.catalog().get("brownfield-cleanup").unwrap();
    assert_eq!(cleanup.cost, 25);
    assert_eq!(cleanup.effects, Metrics::new(3, 12, 10, 8));

    play_round(&mut engine, &["brownfield-cleanup"]);

    let state = engine.state();
    assert_eq!(state.round, 2);
    assert!(state.available("brownfield-playground").is_some());
    assert!(state.available("solar-microgrid").is_some());
    assert!(state.available("brownfield-cleanup").is_none());
}

#[test]
fn tech_fund_alone_commits_expected_metrics() {
    let mut engine = new_engine();
    assert_eq!(engine.state().metrics, Metrics::splat(50));
    play_round(&mut engine, &["tech-jobs"]);
    assert_eq!(engine.state().metrics, Metrics::new(65, 42, 47, 40));
}

#[test]
fn balanced_four_year_plan_reaches_renaissance() {
    let mut engine = new_engine();
    play_round(
        &mut engine,
        &["workforce-training", "brownfield-cleanup", "health-equity"],
    );
    play_round(&mut engine, &["cultural-hub"]);
    play_round(&mut engine, &["transit-expansion"]);
    assert!(!engine.state().is_game_over());
    play_round(&mut engine, &["brownfield-playground"]);

    let state = engine.state();
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.round, MAX_ROUNDS);
    assert_eq!(state.metrics, Metrics::new(80, 100, 81, 84));
    assert_eq!(state.events.len(), 6);

    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.title, "Reddale Renaissance");
    assert_eq!(outcome, classify(&state.metrics));

    let summary = engine.summary().unwrap();
    assert_eq!(summary.outcome, OutcomeKind::Renaissance);
    assert_eq!(summary.decisions.len(), 6);
    assert_eq!(summary.decisions_for_round(1).count(), 3);
    assert_eq!(
        summary.decisions[5].policy_name,
        "Add Community Playground & Sports Field"
    );
}

#[test]
fn empty_submission_leaves_round_and_events_unchanged() {
    let mut engine = new_engine();
    play_round(&mut engine, &["participatory-budget"]);
    let round = engine.state().round;
    let events = engine.state().events.clone();

    assert_eq!(engine.submit_round(), Err(EngineError::EmptySelection));
    assert_eq!(engine.state().round, round);
    assert_eq!(engine.state().events, events);
}

#[test]
fn growth_without_support_ends_as_a_city_of_contrasts() {
    let mut engine = new_engine();
    play_round(&mut engine, &["tech-jobs", "cultural-hub"]);
    play_round(&mut engine, &["tech-jobs-equity"]);
    play_round(&mut engine, &["participatory-budget"]);
    play_round(&mut engine, &["affordable-housing"]);

    // Committed metrics refold from the baseline: support sums to -1 and clamps to 0.
    assert_eq!(engine.state().metrics, Metrics::new(86, 100, 55, 0));
    // Climate never dropped below 50, so the tech boom rule does not fire.
    assert_eq!(
        engine.outcome().unwrap().kind,
        OutcomeKind::CityOfContrasts
    );
}

#[test]
fn restart_after_game_over_allows_a_new_campaign() {
    let mut engine = new_engine();
    for id in [
        "participatory-budget",
        "cultural-hub",
        "health-equity",
        "transit-expansion",
    ] {
        play_round(&mut engine, &[id]);
    }
    assert!(engine.state().is_game_over());

    engine.restart();
    let state = engine.state();
    assert_eq!(state.round, 1);
    assert_eq!(state.budget, INITIAL_BUDGET);
    assert!(state.events.is_empty());
    assert!(state.historical_selections.is_empty());
    assert_eq!(state.metrics, Metrics::splat(50));
    play_round(&mut engine, &["tech-jobs"]);
    assert_eq!(engine.state().round, 2);
}
