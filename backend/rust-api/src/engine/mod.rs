//! Adaptive assessment engine.
//!
//! Keeps a running ability estimate for one candidate in one skill, picks the
//! next question, decides when to stop and turns the final estimate into a
//! report. Every operation here is a pure function over its inputs: the
//! engine owns no state between calls and performs no I/O. Callers own the
//! [`SessionState`] and must serialize updates to it.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod result;
pub mod selector;
pub mod termination;
pub mod updater;

pub use result::{ability_to_level, ability_to_percentile, generate_result};
pub use selector::select_next_question;
pub use termination::should_terminate;
pub use updater::update_ability_estimate;

pub const MIN_ABILITY: f64 = 1.0;
pub const MAX_ABILITY: f64 = 10.0;

/// Confidence reported before the first response.
pub const INITIAL_CONFIDENCE: f64 = 0.3;
pub const MAX_CONFIDENCE: f64 = 0.95;

pub(crate) fn clamp_ability(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_ABILITY;
    }
    value.clamp(MIN_ABILITY, MAX_ABILITY)
}

/// Parameters fixed at session start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub skill: String,
    pub target_questions: u32,
    pub min_questions: u32,
    /// Wall-clock budget. Enforced by the caller, never by the engine.
    pub max_time_minutes: u32,
    pub starting_difficulty: f64,
    pub adaptation_rate: f64,
    pub termination_confidence: f64,
}

impl SessionConfig {
    pub fn new(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skill: String::new(),
            target_questions: 15,
            min_questions: 5,
            max_time_minutes: 30,
            starting_difficulty: 5.0,
            adaptation_rate: 0.5,
            termination_confidence: 0.9,
        }
    }
}

/// One answered question. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseRecord {
    pub question_id: String,
    /// Difficulty of the question at the time it was answered.
    pub difficulty: f64,
    pub correct: bool,
    pub response_time_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_credit: Option<f64>,
}

impl ResponseRecord {
    pub fn new(
        question_id: impl Into<String>,
        difficulty: f64,
        correct: bool,
        response_time_secs: f64,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            difficulty,
            correct,
            response_time_secs,
            partial_credit: None,
        }
    }

    pub fn with_partial_credit(mut self, credit: f64) -> Self {
        self.partial_credit = Some(credit);
        self
    }

    /// Credit in [0, 1]; absent credit follows correctness.
    pub fn credit(&self) -> f64 {
        match self.partial_credit {
            Some(credit) if credit.is_nan() => 0.0,
            Some(credit) => credit.clamp(0.0, 1.0),
            None if self.correct => 1.0,
            None => 0.0,
        }
    }
}

/// Per-candidate estimate and history. The only mutable aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub current_ability: f64,
    pub confidence: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    pub response_history: Vec<ResponseRecord>,
    /// Ability after each response; diagnostics and replay only.
    pub ability_history: Vec<f64>,
}

pub fn initialize_session(config: &SessionConfig) -> SessionState {
    SessionState {
        current_ability: clamp_ability(config.starting_difficulty),
        confidence: INITIAL_CONFIDENCE,
        questions_answered: 0,
        correct_answers: 0,
        consecutive_correct: 0,
        consecutive_incorrect: 0,
        response_history: Vec::new(),
        ability_history: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    MaxQuestions,
    ConfidenceReached,
    ConsistentHighPerformance,
    ConsistentLowPerformance,
    /// No unused question left for the skill.
    QuestionsExhausted,
    TimeLimit,
    Abandoned,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::MaxQuestions => "maximum questions reached",
            TerminationReason::ConfidenceReached => "confidence threshold reached",
            TerminationReason::ConsistentHighPerformance => "consistent high performance",
            TerminationReason::ConsistentLowPerformance => "consistent low performance",
            TerminationReason::QuestionsExhausted => "question pool exhausted",
            TerminationReason::TimeLimit => "time limit reached",
            TerminationReason::Abandoned => "assessment abandoned",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerminationReason::MaxQuestions => "max_questions",
            TerminationReason::ConfidenceReached => "confidence_reached",
            TerminationReason::ConsistentHighPerformance => "consistent_high_performance",
            TerminationReason::ConsistentLowPerformance => "consistent_low_performance",
            TerminationReason::QuestionsExhausted => "questions_exhausted",
            TerminationReason::TimeLimit => "time_limit",
            TerminationReason::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerminationDecision {
    pub stop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TerminationReason>,
}

impl TerminationDecision {
    pub fn proceed() -> Self {
        Self {
            stop: false,
            reason: None,
        }
    }

    pub fn stop(reason: TerminationReason) -> Self {
        Self {
            stop: true,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    Basics,
    Intermediate,
    Advanced,
}

impl DifficultyBand {
    pub const ALL: [DifficultyBand; 3] = [
        DifficultyBand::Basics,
        DifficultyBand::Intermediate,
        DifficultyBand::Advanced,
    ];

    /// basics up to 3, advanced from 7, intermediate in between.
    pub fn classify(difficulty: f64) -> Self {
        if difficulty <= 3.0 {
            DifficultyBand::Basics
        } else if difficulty < 7.0 {
            DifficultyBand::Intermediate
        } else {
            DifficultyBand::Advanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyBand::Basics => "basics",
            DifficultyBand::Intermediate => "intermediate",
            DifficultyBand::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::MidLevel => "Mid-Level",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandBreakdown {
    pub band: DifficultyBand,
    pub correct: u32,
    pub total: u32,
}

impl BandBreakdown {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdaptiveResult {
    pub skill: String,
    pub final_ability: f64,
    pub confidence: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    /// Percentage in [0, 100].
    pub accuracy: f64,
    pub average_response_time_secs: f64,
    pub percentile: u8,
    pub level: SkillLevel,
    pub recommended_level: SkillLevel,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub bands: Vec<BandBreakdown>,
    pub ability_history: Vec<f64>,
}
