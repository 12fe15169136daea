use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::session_store::SessionStore;
use crate::config::AssessmentDefaults;
use crate::engine::{
    self, AdaptiveResult, ResponseRecord, TerminationDecision, TerminationReason,
};
use crate::metrics::{self, ASSESSMENTS_ACTIVE, ASSESSMENTS_TOTAL};
use crate::models::{
    AssessmentSession, AssessmentStatus, AssessmentSummary, CreateAssessmentRequest,
    CreateAssessmentResponse, Question, QuestionCatalog, QuestionKind, QuestionView,
    SkillSummary, SubmitResponseRequest, SubmitResponseResponse,
};

/// Externally graded credit at or above which an answer counts as correct.
pub const PASSING_CREDIT: f64 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Assessment session not found")]
    SessionNotFound,
    #[error("No questions available for skill '{0}'")]
    UnknownSkill(String),
    #[error("Invalid assessment settings: {0}")]
    InvalidSettings(String),
    #[error("Assessment session is already {0}")]
    SessionFinished(&'static str),
    #[error("Question '{got}' is not the current question (expected '{expected}')")]
    QuestionMismatch { expected: String, got: String },
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
    #[error("Assessment is still in progress")]
    ResultNotReady,
}

/// Drives the engine for HTTP callers: owns scoring, wall-clock budgets and
/// the session lifecycle around the pure engine calls.
pub struct AssessmentService {
    catalog: Arc<QuestionCatalog>,
    sessions: SessionStore,
    defaults: AssessmentDefaults,
}

impl AssessmentService {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        sessions: SessionStore,
        defaults: AssessmentDefaults,
    ) -> Self {
        Self {
            catalog,
            sessions,
            defaults,
        }
    }

    pub fn list_skills(&self) -> Vec<SkillSummary> {
        self.catalog.skills()
    }

    pub async fn create_assessment(
        &self,
        req: CreateAssessmentRequest,
    ) -> Result<CreateAssessmentResponse, ServiceError> {
        if !self.catalog.has_skill(&req.skill) {
            return Err(ServiceError::UnknownSkill(req.skill));
        }

        let defaults = self.defaults.session_config(&req.skill);
        let target_questions = req.target_questions.unwrap_or(defaults.target_questions);
        if let Some(min_questions) = req.min_questions {
            if min_questions > target_questions {
                return Err(ServiceError::InvalidSettings(format!(
                    "min_questions {} exceeds target_questions {}",
                    min_questions, target_questions
                )));
            }
        }

        let config = req.to_session_config(&defaults);
        let state = engine::initialize_session(&config);

        let first = engine::select_next_question(&self.catalog, &config.skill, &state, &HashSet::new())
            .ok_or_else(|| ServiceError::UnknownSkill(config.skill.clone()))?;

        let now = Utc::now();
        let session = AssessmentSession {
            id: Uuid::new_v4().to_string(),
            candidate_id: req.candidate_id.clone(),
            config: config.clone(),
            state,
            used_question_ids: HashSet::new(),
            current_question_id: Some(first.id.clone()),
            status: AssessmentStatus::Active,
            termination_reason: None,
            result: None,
            started_at: now,
            updated_at: now,
        };
        let session_id = session.id.clone();

        self.sessions.insert(session).await;

        ASSESSMENTS_TOTAL.with_label_values(&["started"]).inc();
        ASSESSMENTS_ACTIVE.inc();

        tracing::info!(
            "Assessment created: session={}, skill={}, starting_ability={}, first_question={}",
            session_id,
            config.skill,
            config.starting_difficulty,
            first.id
        );

        Ok(CreateAssessmentResponse {
            session_id,
            skill: config.skill.clone(),
            question: QuestionView::from(first),
            config,
            started_at: now,
        })
    }

    pub async fn get_assessment(&self, session_id: &str) -> Result<AssessmentSummary, ServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(ServiceError::SessionNotFound)?;
        let session = handle.lock().await;

        let current_question = session
            .current_question_id
            .as_deref()
            .and_then(|id| self.catalog.find(&session.config.skill, id))
            .map(QuestionView::from);

        Ok(AssessmentSummary {
            session_id: session.id.clone(),
            skill: session.config.skill.clone(),
            candidate_id: session.candidate_id.clone(),
            status: session.status,
            current_ability: session.state.current_ability,
            confidence: session.state.confidence,
            questions_answered: session.state.questions_answered,
            correct_answers: session.state.correct_answers,
            current_question,
            termination_reason: session.termination_reason.map(|r| r.to_string()),
            started_at: session.started_at,
            updated_at: session.updated_at,
        })
    }

    pub async fn submit_response(
        &self,
        session_id: &str,
        req: SubmitResponseRequest,
    ) -> Result<SubmitResponseResponse, ServiceError> {
        self.submit_response_at(session_id, req, Utc::now()).await
    }

    async fn submit_response_at(
        &self,
        session_id: &str,
        req: SubmitResponseRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmitResponseResponse, ServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(ServiceError::SessionNotFound)?;
        let mut session = handle.lock().await;

        if !session.is_active() {
            return Err(ServiceError::SessionFinished(session.status.as_str()));
        }

        let skill = session.config.skill.clone();
        let expected = session.current_question_id.clone().unwrap_or_default();
        if req.question_id != expected {
            return Err(ServiceError::QuestionMismatch {
                expected,
                got: req.question_id,
            });
        }

        let question = self.catalog.find(&skill, &expected).ok_or_else(|| {
            ServiceError::InvalidSubmission(format!("question '{}' is no longer in the catalog", expected))
        })?;
        let (correct, partial_credit) = score_submission(question, &req)?;

        let mut record = ResponseRecord::new(
            question.id.clone(),
            question.difficulty,
            correct,
            req.response_time_seconds,
        );
        if let Some(credit) = partial_credit {
            record = record.with_partial_credit(credit);
        }

        let rate = session.config.adaptation_rate;
        session.state = engine::update_ability_estimate(session.state.clone(), record, rate);
        session.used_question_ids.insert(question.id.clone());
        session.updated_at = now;
        metrics::record_response(&skill, correct);

        tracing::debug!(
            "Response recorded: session={}, question={}, correct={}, ability={:.3}, confidence={:.2}",
            session.id,
            question.id,
            correct,
            session.state.current_ability,
            session.state.confidence
        );

        let mut decision = engine::should_terminate(&session.state, &session.config);
        let mut next_question: Option<&Question> = None;

        if !decision.stop {
            if session.elapsed_minutes(now) >= i64::from(session.config.max_time_minutes) {
                decision = TerminationDecision::stop(TerminationReason::TimeLimit);
            } else {
                match engine::select_next_question(
                    &self.catalog,
                    &skill,
                    &session.state,
                    &session.used_question_ids,
                ) {
                    Some(next) => next_question = Some(next),
                    None => decision = TerminationDecision::stop(TerminationReason::QuestionsExhausted),
                }
            }
        }

        let result = match decision.reason {
            Some(reason) => Some(finish(&mut session, reason)),
            None => {
                session.current_question_id = next_question.map(|q| q.id.clone());
                None
            }
        };

        Ok(SubmitResponseResponse {
            correct,
            current_ability: session.state.current_ability,
            confidence: session.state.confidence,
            questions_answered: session.state.questions_answered,
            finished: result.is_some(),
            termination_reason: decision.reason.map(|r| r.to_string()),
            next_question: next_question.map(QuestionView::from),
            result,
        })
    }

    /// Ends an active session early. Finished sessions return their stored result.
    pub async fn complete_assessment(&self, session_id: &str) -> Result<AdaptiveResult, ServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(ServiceError::SessionNotFound)?;
        let mut session = handle.lock().await;

        if session.is_active() {
            session.updated_at = Utc::now();
            return Ok(finish(&mut session, TerminationReason::Abandoned));
        }

        session.result.clone().ok_or(ServiceError::ResultNotReady)
    }

    pub async fn get_result(&self, session_id: &str) -> Result<AdaptiveResult, ServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(ServiceError::SessionNotFound)?;
        let session = handle.lock().await;

        if session.is_active() {
            return Err(ServiceError::ResultNotReady);
        }

        session.result.clone().ok_or(ServiceError::ResultNotReady)
    }
}

fn finish(session: &mut AssessmentSession, reason: TerminationReason) -> AdaptiveResult {
    let result = engine::generate_result(&session.state, &session.config.skill);

    session.status = if reason == TerminationReason::Abandoned {
        AssessmentStatus::Abandoned
    } else {
        AssessmentStatus::Completed
    };
    session.termination_reason = Some(reason);
    session.current_question_id = None;
    session.result = Some(result.clone());

    metrics::record_finished(reason, &result);

    tracing::info!(
        "Assessment finished: session={}, reason={}, ability={:.2}, level={}, questions={}",
        session.id,
        reason,
        result.final_ability,
        result.level,
        result.questions_answered
    );

    result
}

/// Grades a submission against a question. Multiple-choice answers are
/// checked against the answer key; code and open-ended answers arrive
/// already graded as partial credit.
pub fn score_submission(
    question: &Question,
    req: &SubmitResponseRequest,
) -> Result<(bool, Option<f64>), ServiceError> {
    match &question.kind {
        QuestionKind::MultipleChoice {
            options,
            correct_option,
        } => {
            let selected = req.selected_option.ok_or_else(|| {
                ServiceError::InvalidSubmission(
                    "selected_option is required for multiple-choice questions".to_string(),
                )
            })?;
            if selected >= options.len() {
                return Err(ServiceError::InvalidSubmission(format!(
                    "selected_option {} out of range for {} options",
                    selected,
                    options.len()
                )));
            }
            Ok((selected == *correct_option, None))
        }
        QuestionKind::Code { .. } | QuestionKind::OpenEnded => {
            let credit = req.partial_credit.ok_or_else(|| {
                ServiceError::InvalidSubmission(format!(
                    "partial_credit is required for {} questions",
                    question.kind.as_str()
                ))
            })?;
            if !(0.0..=1.0).contains(&credit) {
                return Err(ServiceError::InvalidSubmission(format!(
                    "partial_credit {} outside [0, 1]",
                    credit
                )));
            }
            Ok((credit >= PASSING_CREDIT, Some(credit)))
        }
    }
}
