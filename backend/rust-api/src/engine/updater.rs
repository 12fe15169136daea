use super::{clamp_ability, ResponseRecord, SessionState, MAX_CONFIDENCE};

/// Response time at which the latency factor is neutral.
const REFERENCE_RESPONSE_SECS: f64 = 30.0;
const MIN_TIME_FACTOR: f64 = 0.8;
const MAX_TIME_FACTOR: f64 = 1.2;

const MIN_ADAPTATION_RATE: f64 = 0.1;
const MAX_ADAPTATION_RATE: f64 = 1.0;

/// Probability of a correct answer under a one-parameter logistic model.
pub fn expected_probability(ability: f64, difficulty: f64) -> f64 {
    1.0 / (1.0 + (-(ability - difficulty)).exp())
}

/// Heuristic latency multiplier. Fast answers amplify the update, slow ones
/// dampen it. Not a calibrated model.
pub fn time_factor(response_time_secs: f64) -> f64 {
    // f64::max maps NaN to 0.0, and 30 / 0 saturates at the upper bound
    let secs = response_time_secs.max(0.0);
    (REFERENCE_RESPONSE_SECS / secs).clamp(MIN_TIME_FACTOR, MAX_TIME_FACTOR)
}

/// Confidence after `answered` responses: 0.3 + 0.1 per response, capped at 0.95.
pub fn confidence_after(answered: u32) -> f64 {
    ((3.0 + answered as f64) / 10.0).min(MAX_CONFIDENCE)
}

/// Folds one response into the session and returns the updated aggregate.
pub fn update_ability_estimate(
    mut state: SessionState,
    response: ResponseRecord,
    adaptation_rate: f64,
) -> SessionState {
    let rate = if adaptation_rate.is_nan() {
        MIN_ADAPTATION_RATE
    } else {
        adaptation_rate.clamp(MIN_ADAPTATION_RATE, MAX_ADAPTATION_RATE)
    };
    let difficulty = clamp_ability(response.difficulty);
    let expected = expected_probability(state.current_ability, difficulty);

    let delta = if response.correct {
        rate * (1.0 - expected) * response.credit()
    } else {
        -rate * expected
    };
    let delta = delta * time_factor(response.response_time_secs);

    state.current_ability = clamp_ability(state.current_ability + delta);
    state.confidence = confidence_after(state.questions_answered + 1);
    state.questions_answered += 1;

    if response.correct {
        state.correct_answers += 1;
        state.consecutive_correct += 1;
        state.consecutive_incorrect = 0;
    } else {
        state.consecutive_incorrect += 1;
        state.consecutive_correct = 0;
    }

    state.response_history.push(response);
    state.ability_history.push(state.current_ability);

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{initialize_session, SessionConfig, MAX_ABILITY, MIN_ABILITY};

    fn fresh() -> SessionState {
        initialize_session(&SessionConfig::new("rust"))
    }

    #[test]
    fn expected_probability_is_half_at_matching_difficulty() {
        assert!((expected_probability(5.0, 5.0) - 0.5).abs() < 1e-12);
        assert!(expected_probability(8.0, 3.0) > 0.99);
        assert!(expected_probability(2.0, 9.0) < 0.01);
    }

    #[test]
    fn time_factor_is_bounded() {
        assert_eq!(time_factor(30.0), 1.0);
        assert_eq!(time_factor(5.0), 1.2);
        assert_eq!(time_factor(300.0), 0.8);
        assert_eq!(time_factor(0.0), 1.2);
        assert_eq!(time_factor(-4.0), 1.2);
        assert_eq!(time_factor(f64::NAN), 1.2);
        assert!((time_factor(25.0) - 1.2).abs() < 1e-12);
        assert!((time_factor(37.5) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn correct_answer_moves_ability_up() {
        let state = update_ability_estimate(fresh(), ResponseRecord::new("q1", 5.0, true, 30.0), 0.5);

        // p = 0.5, delta = 0.5 * 0.5 * 1.0 * 1.0
        assert!((state.current_ability - 5.25).abs() < 1e-12);
        assert_eq!(state.correct_answers, 1);
        assert_eq!(state.consecutive_correct, 1);
        assert_eq!(state.ability_history, vec![state.current_ability]);
    }

    #[test]
    fn incorrect_answer_moves_ability_down() {
        let state = update_ability_estimate(fresh(), ResponseRecord::new("q1", 5.0, false, 30.0), 0.5);

        assert!((state.current_ability - 4.75).abs() < 1e-12);
        assert_eq!(state.correct_answers, 0);
        assert_eq!(state.consecutive_incorrect, 1);
    }

    #[test]
    fn surprising_outcomes_move_further() {
        let hard_correct =
            update_ability_estimate(fresh(), ResponseRecord::new("q", 9.0, true, 30.0), 0.5);
        let easy_correct =
            update_ability_estimate(fresh(), ResponseRecord::new("q", 1.0, true, 30.0), 0.5);
        assert!(hard_correct.current_ability - 5.0 > easy_correct.current_ability - 5.0);

        let easy_wrong =
            update_ability_estimate(fresh(), ResponseRecord::new("q", 1.0, false, 30.0), 0.5);
        let hard_wrong =
            update_ability_estimate(fresh(), ResponseRecord::new("q", 9.0, false, 30.0), 0.5);
        assert!(5.0 - easy_wrong.current_ability > 5.0 - hard_wrong.current_ability);
    }

    #[test]
    fn partial_credit_scales_upward_move() {
        let full = update_ability_estimate(fresh(), ResponseRecord::new("q", 5.0, true, 30.0), 0.5);
        let half = update_ability_estimate(
            fresh(),
            ResponseRecord::new("q", 5.0, true, 30.0).with_partial_credit(0.5),
            0.5,
        );

        assert!((half.current_ability - 5.125).abs() < 1e-12);
        assert!(half.current_ability < full.current_ability);
    }

    #[test]
    fn fast_answers_amplify_delta() {
        let fast = update_ability_estimate(fresh(), ResponseRecord::new("q", 5.0, true, 10.0), 0.5);
        let slow = update_ability_estimate(fresh(), ResponseRecord::new("q", 5.0, true, 120.0), 0.5);

        assert!((fast.current_ability - 5.3).abs() < 1e-12);
        assert!((slow.current_ability - 5.2).abs() < 1e-12);
    }

    #[test]
    fn ability_stays_within_scale() {
        let mut up = fresh();
        let mut down = fresh();
        for i in 0..200 {
            up = update_ability_estimate(up, ResponseRecord::new(format!("u{i}"), 10.0, true, 1.0), 1.0);
            down = update_ability_estimate(down, ResponseRecord::new(format!("d{i}"), 1.0, false, 1.0), 1.0);
        }

        assert!(up.current_ability <= MAX_ABILITY);
        assert!(down.current_ability >= MIN_ABILITY);
    }

    #[test]
    fn confidence_follows_question_count() {
        let mut state = fresh();
        for n in 1..=10u32 {
            let correct = n % 3 == 0;
            state = update_ability_estimate(state, ResponseRecord::new(format!("q{n}"), 5.0, correct, 30.0), 0.5);
            assert_eq!(state.confidence, confidence_after(n));
        }
        assert_eq!(state.confidence, MAX_CONFIDENCE);
        assert_eq!(confidence_after(1), 0.4);
        assert_eq!(confidence_after(5), 0.8);
    }

    #[test]
    fn streak_counters_are_exclusive() {
        let pattern = [true, true, false, true, false, false, false, true];
        let mut state = fresh();
        for (i, correct) in pattern.iter().enumerate() {
            state = update_ability_estimate(state, ResponseRecord::new(format!("q{i}"), 5.0, *correct, 30.0), 0.5);
            assert!(state.consecutive_correct == 0 || state.consecutive_incorrect == 0);
        }
        assert_eq!(state.consecutive_correct, 1);
        assert_eq!(state.consecutive_incorrect, 0);
        assert_eq!(state.response_history.len(), pattern.len());
    }

    #[test]
    fn out_of_range_rate_is_clamped() {
        let clamped = update_ability_estimate(fresh(), ResponseRecord::new("q", 5.0, true, 30.0), 7.0);
        let max = update_ability_estimate(fresh(), ResponseRecord::new("q", 5.0, true, 30.0), 1.0);
        assert_eq!(clamped.current_ability, max.current_ability);
    }
}
