use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, HistogramVec, IntCounterVec, IntGauge, TextEncoder,
};

use crate::engine::{AdaptiveResult, TerminationReason};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Assessment Metrics
    pub static ref ASSESSMENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assessments_total",
        "Total number of adaptive assessments by lifecycle event",
        &["event"]
    )
    .unwrap();

    pub static ref ASSESSMENTS_ACTIVE: IntGauge = register_int_gauge!(
        "assessments_active",
        "Number of adaptive assessments currently in progress"
    )
    .unwrap();

    pub static ref RESPONSES_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assessment_responses_total",
        "Total number of responses submitted",
        &["skill", "correct"]
    )
    .unwrap();

    pub static ref TERMINATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assessment_terminations_total",
        "Finished assessments by termination reason",
        &["reason"]
    )
    .unwrap();

    pub static ref FINAL_ABILITY: Histogram = register_histogram!(
        "assessment_final_ability",
        "Final ability estimate of finished assessments",
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
    )
    .unwrap();

    pub static ref QUESTIONS_PER_ASSESSMENT: Histogram = register_histogram!(
        "assessment_questions_answered",
        "Number of questions answered per finished assessment",
        vec![1.0, 3.0, 5.0, 8.0, 10.0, 15.0, 20.0, 30.0, 50.0]
    )
    .unwrap();

    pub static ref SESSIONS_EVICTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "assessment_sessions_evicted_total",
        "Sessions removed by the idle reaper",
        &["status"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

pub fn record_response(skill: &str, correct: bool) {
    let correct_label = if correct { "true" } else { "false" };
    RESPONSES_SUBMITTED_TOTAL
        .with_label_values(&[skill, correct_label])
        .inc();
}

/// Records a session leaving the active state.
pub fn record_finished(reason: TerminationReason, result: &AdaptiveResult) {
    let event = if reason == TerminationReason::Abandoned {
        "abandoned"
    } else {
        "completed"
    };
    ASSESSMENTS_TOTAL.with_label_values(&[event]).inc();
    ASSESSMENTS_ACTIVE.dec();
    TERMINATIONS_TOTAL.with_label_values(&[reason.label()]).inc();
    FINAL_ABILITY.observe(result.final_ability);
    QUESTIONS_PER_ASSESSMENT.observe(result.questions_answered as f64);
}
