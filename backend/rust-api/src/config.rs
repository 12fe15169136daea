use serde::Deserialize;
use std::env;

use crate::engine::SessionConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub catalog_path: String,
    pub session_ttl_seconds: u64,
    pub reaper_interval_secs: u64,
    pub metrics_auth: String,
    pub assessment: AssessmentDefaults,
}

/// Session parameters applied when a create request leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssessmentDefaults {
    pub target_questions: u32,
    pub min_questions: u32,
    pub max_time_minutes: u32,
    pub starting_difficulty: f64,
    pub adaptation_rate: f64,
    pub termination_confidence: f64,
}

impl Default for AssessmentDefaults {
    fn default() -> Self {
        let base = SessionConfig::default();
        Self {
            target_questions: base.target_questions,
            min_questions: base.min_questions,
            max_time_minutes: base.max_time_minutes,
            starting_difficulty: base.starting_difficulty,
            adaptation_rate: base.adaptation_rate,
            termination_confidence: base.termination_confidence,
        }
    }
}

impl AssessmentDefaults {
    pub fn session_config(&self, skill: &str) -> SessionConfig {
        SessionConfig {
            skill: skill.to_string(),
            target_questions: self.target_questions,
            min_questions: self.min_questions.min(self.target_questions),
            max_time_minutes: self.max_time_minutes,
            starting_difficulty: self.starting_difficulty,
            adaptation_rate: self.adaptation_rate,
            termination_confidence: self.termination_confidence,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            catalog_path: "catalog/questions.json".to_string(),
            session_ttl_seconds: 7200,
            reaper_interval_secs: 60,
            metrics_auth: "admin:changeme".to_string(),
            assessment: AssessmentDefaults::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the crate-local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + APP__ overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let catalog_path = settings
            .get_string("catalog.path")
            .or_else(|_| env::var("CATALOG_PATH"))
            .unwrap_or(defaults.catalog_path);

        let session_ttl_seconds = settings
            .get_int("sessions.ttl_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| parse_env("SESSION_TTL_SECONDS"))
            .filter(|v| *v > 0)
            .unwrap_or(defaults.session_ttl_seconds);

        let reaper_interval_secs = settings
            .get_int("sessions.reaper_interval_secs")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| parse_env("SESSION_REAPER_INTERVAL_SECS"))
            .filter(|v| *v > 0)
            .unwrap_or(defaults.reaper_interval_secs);

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    eprintln!("WARNING: METRICS_AUTH not set in production, using default credentials");
                }
                defaults.metrics_auth
            });

        let assessment = match settings.get::<AssessmentDefaults>("assessment") {
            Ok(assessment) => assessment,
            Err(config::ConfigError::NotFound(_)) => defaults.assessment,
            Err(e) => return Err(e),
        };
        validate_assessment_defaults(&assessment)?;

        Ok(Config {
            bind_addr,
            catalog_path,
            session_ttl_seconds,
            reaper_interval_secs,
            metrics_auth,
            assessment,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn validate_assessment_defaults(defaults: &AssessmentDefaults) -> Result<(), config::ConfigError> {
    if defaults.target_questions == 0 {
        return Err(config::ConfigError::Message(
            "assessment.target_questions must be positive".to_string(),
        ));
    }
    if !(0.1..=1.0).contains(&defaults.adaptation_rate) {
        return Err(config::ConfigError::Message(format!(
            "assessment.adaptation_rate {} outside [0.1, 1.0]",
            defaults.adaptation_rate
        )));
    }
    if !(1.0..=10.0).contains(&defaults.starting_difficulty) {
        return Err(config::ConfigError::Message(format!(
            "assessment.starting_difficulty {} outside [1, 10]",
            defaults.starting_difficulty
        )));
    }
    if !(0.0..=1.0).contains(&defaults.termination_confidence) {
        return Err(config::ConfigError::Message(format!(
            "assessment.termination_confidence {} outside [0, 1]",
            defaults.termination_confidence
        )));
    }
    Ok(())
}
