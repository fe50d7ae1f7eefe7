pub mod pacer;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::octagon_api::{normalize_directory_fighter, OctagonApiClient};
use crate::config::AppConfig;
use crate::models::{
    BulkRefreshError, BulkRefreshReport, EventListRefresh, RankingsSnapshot, UfcEvent,
};
use crate::scrapers::client::UfcClient;
use crate::scrapers::{event_details, events, rankings, ScrapeError};
use crate::store::{DocStore, StoreError};
use pacer::RefreshPacer;

/// API-facing failure taxonomy; the web handlers map these onto statuses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("scraping is disabled by configuration")]
    ScrapingDisabled,
    #[error("{0}")]
    NotFound(String),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScrapeError> for ServiceError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Disabled => ServiceError::ScrapingDisabled,
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

/// Which stored events a bulk details refresh targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    All,
    Upcoming,
    Past,
}

impl RefreshScope {
    fn is_upcoming(self) -> Option<bool> {
        match self {
            RefreshScope::All => None,
            RefreshScope::Upcoming => Some(true),
            RefreshScope::Past => Some(false),
        }
    }

    fn label(self) -> &'static str {
        match self {
            RefreshScope::All => "all",
            RefreshScope::Upcoming => "upcoming",
            RefreshScope::Past => "past",
        }
    }
}

/// Orchestrates scraping, directory sync, and storage.
///
/// Handlers run concurrently, so detail refreshes of the same event are
/// serialized through a per-event lock; bulk refreshes stay strictly
/// sequential with explicit pacing between requests.
pub struct UfcService {
    store: Arc<DocStore>,
    client: UfcClient,
    directory: OctagonApiClient,
    pacer: RefreshPacer,
    event_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UfcService {
    pub fn new(config: &AppConfig, store: Arc<DocStore>) -> Self {
        Self {
            store,
            client: UfcClient::new(config.scrape.clone()),
            directory: OctagonApiClient::new(config.fighters_api_url.clone()),
            pacer: RefreshPacer::default(),
            event_locks: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn with_pacer(mut self, pacer: RefreshPacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn store(&self) -> &Arc<DocStore> {
        &self.store
    }

    fn ensure_scraping_enabled(&self) -> Result<(), ServiceError> {
        if self.client.is_disabled() {
            Err(ServiceError::ScrapingDisabled)
        } else {
            Ok(())
        }
    }

    async fn event_lock(&self, ufc_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.event_locks.lock().await;
        locks.entry(ufc_id.to_string()).or_default().clone()
    }

    /// Pull the fighters directory and upsert every record.
    pub async fn sync_fighters(&self) -> Result<usize, ServiceError> {
        self.ensure_scraping_enabled()?;

        let directory = self
            .directory
            .fetch_fighters()
            .await
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;

        let fighters = directory
            .iter()
            .map(|(slug, record)| normalize_directory_fighter(slug, record))
            .collect();
        let count = self.store.upsert_fighters(fighters).await?;
        info!(count, "fighter directory synced");
        Ok(count)
    }

    /// Scrape the events index and upsert every header found.
    pub async fn refresh_event_list(&self) -> Result<EventListRefresh, ServiceError> {
        self.ensure_scraping_enabled()?;

        let html = self.client.fetch("/events").await?;
        let raw = events::extract_event_list(&html, Utc::now().date_naive())?;

        let upcoming_count = raw.iter().filter(|e| e.is_upcoming).count();
        let past_count = raw.len() - upcoming_count;
        let total = self.store.upsert_event_headers(raw).await?;

        info!(upcoming_count, past_count, "event list refreshed");
        Ok(EventListRefresh {
            upcoming_count,
            past_count,
            total,
        })
    }

    /// Refresh one event's fight card under that event's lock.
    pub async fn refresh_event_details(&self, ufc_id: &str) -> Result<UfcEvent, ServiceError> {
        self.ensure_scraping_enabled()?;

        let event = self
            .store
            .get_event(ufc_id)
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("event \"{ufc_id}\" not found")))?;

        let lock = self.event_lock(ufc_id).await;
        let _guard = lock.lock().await;

        let html = self.client.fetch(&format!("/event/{ufc_id}")).await?;
        let fights = event_details::extract_fight_card(&html, ufc_id, Some(&event.name))?;
        debug!(ufc_id, fights = fights.len(), "fight card extracted");

        self.store
            .set_event_fights(ufc_id, fights)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("event \"{ufc_id}\" not found")))
    }

    /// Refresh details for every event the scope selects, sequentially.
    ///
    /// Per-event failures land in the report instead of aborting the batch;
    /// only an empty scope is an error.
    pub async fn bulk_refresh_details(
        &self,
        scope: RefreshScope,
    ) -> Result<BulkRefreshReport, ServiceError> {
        self.ensure_scraping_enabled()?;

        let targets = self.store.event_refresh_targets(scope.is_upcoming()).await;
        if targets.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no {} events to refresh",
                scope.label()
            )));
        }

        info!(scope = scope.label(), total = targets.len(), "bulk details refresh started");

        let mut updated_count = 0;
        let mut errors = Vec::new();
        let total_events = targets.len();

        for (index, ufc_id) in targets.iter().enumerate() {
            match self.refresh_event_details(ufc_id).await {
                Ok(_) => {
                    updated_count += 1;
                    if index + 1 < total_events {
                        self.pacer.after_success().await;
                    }
                }
                Err(err) => {
                    warn!(ufc_id, error = %err, "event details refresh failed");
                    errors.push(BulkRefreshError {
                        ufc_id: ufc_id.clone(),
                        error: err.to_string(),
                    });
                    if index + 1 < total_events {
                        self.pacer.after_failure().await;
                    }
                }
            }
        }

        info!(
            scope = scope.label(),
            updated = updated_count,
            failed = errors.len(),
            "bulk details refresh finished"
        );

        Ok(BulkRefreshReport {
            total_events,
            updated_count,
            failed_count: errors.len(),
            errors,
        })
    }

    /// Scrape the rankings page and replace the stored snapshot.
    ///
    /// A page yielding zero divisions is treated as an upstream failure so a
    /// markup change cannot silently wipe the previous snapshot.
    pub async fn refresh_rankings(&self) -> Result<RankingsSnapshot, ServiceError> {
        self.ensure_scraping_enabled()?;

        let html = self.client.fetch("/rankings").await?;
        let divisions = rankings::extract_rankings(&html)?;
        if divisions.is_empty() {
            return Err(ServiceError::Upstream(
                "rankings page yielded no divisions".to_string(),
            ));
        }

        info!(divisions = divisions.len(), "rankings refreshed");
        Ok(self.store.replace_rankings(divisions).await?)
    }
}
