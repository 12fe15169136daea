use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use super::question::QuestionView;
use crate::engine::{AdaptiveResult, SessionConfig, SessionState, TerminationReason};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Active,
    Completed,
    Abandoned,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Active => "active",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Abandoned => "abandoned",
        }
    }
}

/// Server-side record of one adaptive test. Held behind a per-session lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub id: String,
    pub candidate_id: Option<String>,
    pub config: SessionConfig,
    pub state: SessionState,
    pub used_question_ids: HashSet<String>,
    pub current_question_id: Option<String>,
    pub status: AssessmentStatus,
    pub termination_reason: Option<TerminationReason>,
    pub result: Option<AdaptiveResult>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn is_active(&self) -> bool {
        self.status == AssessmentStatus::Active
    }

    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_question_counts"))]
pub struct CreateAssessmentRequest {
    #[validate(length(min = 1, max = 100, message = "Skill must be between 1 and 100 characters"))]
    pub skill: String,
    #[validate(length(max = 128))]
    pub candidate_id: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub target_questions: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub min_questions: Option<u32>,
    #[validate(range(min = 1, max = 600))]
    pub max_time_minutes: Option<u32>,
    #[validate(range(min = 1.0, max = 10.0))]
    pub starting_difficulty: Option<f64>,
    #[validate(range(min = 0.1, max = 1.0, message = "Adaptation rate must be between 0.1 and 1.0"))]
    pub adaptation_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub termination_confidence: Option<f64>,
}

fn validate_question_counts(req: &CreateAssessmentRequest) -> Result<(), ValidationError> {
    if let (Some(min), Some(target)) = (req.min_questions, req.target_questions) {
        if min > target {
            let mut err = ValidationError::new("question_counts");
            err.message = Some("min_questions must not exceed target_questions".into());
            return Err(err);
        }
    }
    Ok(())
}

impl CreateAssessmentRequest {
    /// Overlays the request's overrides on the service defaults.
    pub fn to_session_config(&self, defaults: &SessionConfig) -> SessionConfig {
        let target_questions = self.target_questions.unwrap_or(defaults.target_questions);
        let min_questions = self
            .min_questions
            .unwrap_or(defaults.min_questions)
            .min(target_questions);

        SessionConfig {
            skill: self.skill.clone(),
            target_questions,
            min_questions,
            max_time_minutes: self.max_time_minutes.unwrap_or(defaults.max_time_minutes),
            starting_difficulty: self
                .starting_difficulty
                .unwrap_or(defaults.starting_difficulty),
            adaptation_rate: self.adaptation_rate.unwrap_or(defaults.adaptation_rate),
            termination_confidence: self
                .termination_confidence
                .unwrap_or(defaults.termination_confidence),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAssessmentResponse {
    pub session_id: String,
    pub skill: String,
    pub config: SessionConfig,
    pub question: QuestionView,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitResponseRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
    /// Index into the options of a multiple-choice question.
    pub selected_option: Option<usize>,
    /// Externally graded credit for code and open-ended questions.
    #[validate(range(min = 0.0, max = 1.0))]
    pub partial_credit: Option<f64>,
    #[validate(range(min = 0.0, max = 86400.0))]
    pub response_time_seconds: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponseResponse {
    pub correct: bool,
    pub current_ability: f64,
    pub confidence: f64,
    pub questions_answered: u32,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AdaptiveResult>,
}

/// Public snapshot of a session.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub session_id: String,
    pub skill: String,
    pub candidate_id: Option<String>,
    pub status: AssessmentStatus,
    pub current_ability: f64,
    pub confidence: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
