use std::sync::Arc;

use crate::config::Config;
use crate::models::QuestionCatalog;

pub mod assessment_service;
pub mod session_reaper;
pub mod session_store;

use assessment_service::AssessmentService;
use session_store::SessionStore;

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<QuestionCatalog>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, catalog: QuestionCatalog) -> Self {
        tracing::info!(
            "Application state initialized with {} questions across {} skills",
            catalog.len(),
            catalog.skills().len()
        );

        Self {
            config,
            catalog: Arc::new(catalog),
            sessions: SessionStore::new(),
        }
    }

    pub fn assessment_service(&self) -> AssessmentService {
        AssessmentService::new(
            self.catalog.clone(),
            self.sessions.clone(),
            self.config.assessment.clone(),
        )
    }
}
