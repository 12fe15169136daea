use std::collections::HashSet;

use assessment_api::engine::{
    ability_to_percentile, generate_result, initialize_session, select_next_question,
    should_terminate, update_ability_estimate, DifficultyBand, ResponseRecord, SessionConfig,
    SessionState, TerminationReason,
};
use assessment_api::models::QuestionCatalog;

mod common;

fn config() -> SessionConfig {
    SessionConfig {
        starting_difficulty: 5.0,
        adaptation_rate: 0.5,
        ..SessionConfig::new("rust")
    }
}

/// Deterministic mix of outcomes, difficulties and response times.
fn replay(n: usize, seed: u64) -> Vec<SessionState> {
    let mut x = seed;
    let mut state = initialize_session(&config());
    let mut snapshots = Vec::with_capacity(n);

    for i in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let correct = (x >> 33) % 3 != 0;
        let difficulty = 1.0 + ((x >> 40) % 10) as f64;
        let secs = 1.0 + ((x >> 20) % 120) as f64;

        state = update_ability_estimate(
            state,
            ResponseRecord::new(format!("q{i}"), difficulty, correct, secs),
            0.5,
        );
        snapshots.push(state.clone());
    }

    snapshots
}

#[test]
fn confidence_depends_only_on_question_count() {
    for seed in [1, 7, 42, 1234] {
        for (i, state) in replay(15, seed).iter().enumerate() {
            let n = (i + 1) as f64;
            let expected = (0.3 + n * 0.1).min(0.95);
            assert!((state.confidence - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn ability_and_streak_invariants_hold() {
    for seed in [3, 99, 2024] {
        for state in replay(60, seed) {
            assert!((1.0..=10.0).contains(&state.current_ability));
            assert!(state.consecutive_correct == 0 || state.consecutive_incorrect == 0);
            assert_eq!(state.response_history.len() as u32, state.questions_answered);
            assert_eq!(state.ability_history.len(), state.response_history.len());
        }
    }
}

#[test]
fn selection_is_deterministic() {
    let catalog = common::test_catalog();
    let state = replay(4, 11).pop().unwrap();
    let used: HashSet<String> = ["rust-05".to_string(), "rust-06".to_string()]
        .into_iter()
        .collect();

    let first = select_next_question(&catalog, "rust", &state, &used).map(|q| q.id.clone());
    for _ in 0..20 {
        let again = select_next_question(&catalog, "rust", &state, &used).map(|q| q.id.clone());
        assert_eq!(first, again);
    }
    assert!(first.is_some());
    assert!(!used.contains(first.as_ref().unwrap()));
}

#[test]
fn never_stops_before_minimum_questions() {
    let config = SessionConfig {
        min_questions: 6,
        target_questions: 2,
        termination_confidence: 0.0,
        ..config()
    };

    for answered in 0..6 {
        let mut state = initialize_session(&config);
        state.questions_answered = answered;
        state.confidence = 0.95;
        state.consecutive_correct = 10;
        assert!(!should_terminate(&state, &config).stop);
    }
}

#[test]
fn convergence_on_hard_correct_answers() {
    let mut state = initialize_session(&config());
    let start = state.current_ability;

    for i in 0..10 {
        state = update_ability_estimate(
            state,
            ResponseRecord::new(format!("hard-{i}"), 8.0, true, 20.0),
            0.5,
        );
    }

    assert_eq!(start, 5.0);
    assert!(state.current_ability > 5.0);
    assert!(state.current_ability <= 10.0);
    assert!(state.ability_history.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn streak_of_correct_answers_stops_the_test() {
    let session_config = config();
    let mut state = initialize_session(&session_config);

    for i in 0..5 {
        state = update_ability_estimate(
            state,
            ResponseRecord::new(format!("q{i}"), 5.0, true, 30.0),
            0.5,
        );
    }
    let decision = should_terminate(&state, &session_config);

    // confidence is 0.8 after five answers, below the 0.9 default
    assert!(decision.stop);
    assert_eq!(decision.reason, Some(TerminationReason::ConsistentHighPerformance));
}

#[test]
fn percentile_midpoint() {
    assert_eq!(ability_to_percentile(5.0), 50);
}

#[test]
fn band_classification_scenario() {
    assert_eq!(DifficultyBand::classify(3.0), DifficultyBand::Basics);
    assert_eq!(DifficultyBand::classify(6.0), DifficultyBand::Intermediate);
    assert_eq!(DifficultyBand::classify(7.0), DifficultyBand::Advanced);
}

#[test]
fn single_question_catalog_is_exhausted_after_use() {
    let catalog = QuestionCatalog::from_questions(vec![common::mc("solo", "solo-1", 5.0, 0)]).unwrap();
    let state = initialize_session(&SessionConfig::new("solo"));

    let question = select_next_question(&catalog, "solo", &state, &HashSet::new()).unwrap();
    assert_eq!(question.id, "solo-1");

    let state = update_ability_estimate(
        state,
        ResponseRecord::new(question.id.clone(), question.difficulty, true, 15.0),
        0.5,
    );
    let used: HashSet<String> = [question.id.clone()].into_iter().collect();

    assert!(select_next_question(&catalog, "solo", &state, &used).is_none());
}

#[test]
fn result_on_empty_session_has_zero_accuracy() {
    let state = initialize_session(&config());
    let result = generate_result(&state, "rust");

    assert_eq!(result.accuracy, 0.0);
    assert!(!result.accuracy.is_nan());
    assert_eq!(result.percentile, 50);
    assert!(!result.strengths.is_empty());
    assert!(!result.weaknesses.is_empty());
}
