use super::{AdaptiveResult, BandBreakdown, DifficultyBand, SessionState, SkillLevel};

const STRENGTH_RATIO: f64 = 0.7;
const STRENGTH_MIN_RESPONSES: u32 = 1;
const WEAKNESS_RATIO: f64 = 0.4;
const WEAKNESS_MIN_RESPONSES: u32 = 2;

pub fn ability_to_level(ability: f64) -> SkillLevel {
    if ability <= 3.0 {
        SkillLevel::Beginner
    } else if ability <= 7.0 {
        SkillLevel::MidLevel
    } else {
        SkillLevel::Advanced
    }
}

/// Fixed sigmoid centred on ability 5. A presentation transform, not a rank
/// against any real population.
pub fn ability_to_percentile(ability: f64) -> u8 {
    let raw = 100.0 / (1.0 + (-(ability - 5.0) * 0.8).exp());
    raw.round().clamp(0.0, 100.0) as u8
}

pub fn band_breakdown(state: &SessionState) -> Vec<BandBreakdown> {
    let mut bands: Vec<BandBreakdown> = DifficultyBand::ALL
        .iter()
        .map(|band| BandBreakdown {
            band: *band,
            correct: 0,
            total: 0,
        })
        .collect();

    for response in &state.response_history {
        let band = DifficultyBand::classify(response.difficulty);
        if let Some(entry) = bands.iter_mut().find(|entry| entry.band == band) {
            entry.total += 1;
            if response.correct {
                entry.correct += 1;
            }
        }
    }

    bands
}

fn strength_statement(band: DifficultyBand, skill: &str) -> String {
    match band {
        DifficultyBand::Basics => format!("Solid grasp of {} fundamentals", skill),
        DifficultyBand::Intermediate => format!("Handles intermediate {} problems well", skill),
        DifficultyBand::Advanced => format!("Strong command of advanced {} concepts", skill),
    }
}

fn weakness_statement(band: DifficultyBand, skill: &str) -> String {
    match band {
        DifficultyBand::Basics => format!("Needs to review {} fundamentals", skill),
        DifficultyBand::Intermediate => {
            format!("Needs more practice with intermediate {} problems", skill)
        }
        DifficultyBand::Advanced => format!("Advanced {} concepts need further study", skill),
    }
}

/// Reduces a finished session into the candidate-facing report.
pub fn generate_result(state: &SessionState, skill: &str) -> AdaptiveResult {
    let answered = state.questions_answered;
    let accuracy = if answered == 0 {
        0.0
    } else {
        state.correct_answers as f64 / answered as f64 * 100.0
    };

    let average_response_time_secs = if state.response_history.is_empty() {
        0.0
    } else {
        state
            .response_history
            .iter()
            .map(|response| response.response_time_secs)
            .sum::<f64>()
            / state.response_history.len() as f64
    };

    let bands = band_breakdown(state);

    let mut strengths: Vec<String> = bands
        .iter()
        .filter(|b| b.total >= STRENGTH_MIN_RESPONSES && b.ratio() >= STRENGTH_RATIO)
        .map(|b| strength_statement(b.band, skill))
        .collect();
    let mut weaknesses: Vec<String> = bands
        .iter()
        .filter(|b| b.total >= WEAKNESS_MIN_RESPONSES && b.ratio() < WEAKNESS_RATIO)
        .map(|b| weakness_statement(b.band, skill))
        .collect();

    if strengths.is_empty() {
        strengths.push(format!("Shows developing {} knowledge", skill));
    }
    if weaknesses.is_empty() {
        weaknesses.push("No significant weaknesses identified".to_string());
    }

    AdaptiveResult {
        skill: skill.to_string(),
        final_ability: state.current_ability,
        confidence: state.confidence,
        questions_answered: answered,
        correct_answers: state.correct_answers,
        accuracy,
        average_response_time_secs,
        percentile: ability_to_percentile(state.current_ability),
        level: ability_to_level(state.current_ability),
        recommended_level: ability_to_level(state.current_ability),
        strengths,
        weaknesses,
        bands,
        ability_history: state.ability_history.clone(),
    }
}
