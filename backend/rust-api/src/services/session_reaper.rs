use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use super::session_store::SessionStore;
use crate::config::Config;
use crate::metrics::{ASSESSMENTS_ACTIVE, ASSESSMENTS_TOTAL, SESSIONS_EVICTED_TOTAL};
use crate::models::AssessmentStatus;

const MAX_TTL_SECS: u64 = 30 * 24 * 3600;

/// Periodically evicts sessions that have been idle past the configured TTL.
pub struct SessionReaper {
    sessions: SessionStore,
    ttl: chrono::Duration,
    interval: Duration,
}

impl SessionReaper {
    pub fn new(sessions: SessionStore, config: &Config) -> Self {
        let ttl_secs = config.session_ttl_seconds.min(MAX_TTL_SECS) as i64;
        Self {
            sessions,
            ttl: chrono::Duration::seconds(ttl_secs),
            interval: Duration::from_secs(config.reaper_interval_secs),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(&self) {
        info!(
            "Starting session reaper (ttl {}s, interval {}s)",
            self.ttl.num_seconds(),
            self.interval.as_secs()
        );

        loop {
            sleep(self.interval).await;
            self.run_once(Utc::now()).await;
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> usize {
        if self.sessions.is_empty().await {
            debug!("Session reaper tick: no sessions");
            return 0;
        }

        let evicted = self.sessions.evict_idle(self.ttl, now).await;

        for status in &evicted {
            SESSIONS_EVICTED_TOTAL
                .with_label_values(&[status.as_str()])
                .inc();
            if *status == AssessmentStatus::Active {
                ASSESSMENTS_TOTAL.with_label_values(&["expired"]).inc();
                ASSESSMENTS_ACTIVE.dec();
            }
        }

        if evicted.is_empty() {
            debug!("Session reaper tick: nothing to evict");
        } else {
            info!("Session reaper evicted {} idle sessions", evicted.len());
        }

        evicted.len()
    }
}
