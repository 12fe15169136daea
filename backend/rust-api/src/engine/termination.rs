use super::{SessionConfig, SessionState, TerminationDecision, TerminationReason};

pub const HIGH_PERFORMANCE_STREAK: u32 = 5;
/// Losing streaks end a session one question sooner than winning streaks.
pub const LOW_PERFORMANCE_STREAK: u32 = 4;

/// Decides whether to stop after the latest response has been folded into
/// `state`. Nothing stops a session before `min_questions` answers.
pub fn should_terminate(state: &SessionState, config: &SessionConfig) -> TerminationDecision {
    if state.questions_answered < config.min_questions {
        return TerminationDecision::proceed();
    }

    if state.questions_answered >= config.target_questions {
        return TerminationDecision::stop(TerminationReason::MaxQuestions);
    }

    if state.confidence >= config.termination_confidence {
        return TerminationDecision::stop(TerminationReason::ConfidenceReached);
    }

    if state.consecutive_correct >= HIGH_PERFORMANCE_STREAK {
        return TerminationDecision::stop(TerminationReason::ConsistentHighPerformance);
    }

    if state.consecutive_incorrect >= LOW_PERFORMANCE_STREAK {
        return TerminationDecision::stop(TerminationReason::ConsistentLowPerformance);
    }

    TerminationDecision::proceed()
}
