use std::collections::HashSet;

use super::{clamp_ability, SessionState};
use crate::models::question::{Question, QuestionCatalog};

/// Selection aims slightly above the current estimate.
pub const CHALLENGE_OFFSET: f64 = 0.5;

pub fn target_difficulty(state: &SessionState) -> f64 {
    clamp_ability(state.current_ability + CHALLENGE_OFFSET)
}

/// Picks the unused question for `skill` whose difficulty is closest to the
/// target. Ties go to the earliest question in catalog order. `None` means
/// the skill has nothing left to ask.
pub fn select_next_question<'c>(
    catalog: &'c QuestionCatalog,
    skill: &str,
    state: &SessionState,
    used_ids: &HashSet<String>,
) -> Option<&'c Question> {
    let target = target_difficulty(state);

    catalog
        .questions_for(skill)
        .iter()
        .filter(|question| !used_ids.contains(&question.id))
        .min_by(|a, b| {
            let da = (a.difficulty - target).abs();
            let db = (b.difficulty - target).abs();
            da.total_cmp(&db)
        })
}
