use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{
    Division, Fighter, FighterUpdate, RankingsSnapshot, RawEvent, UfcEvent,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("fighter \"{0}\" already exists")]
    AlreadyExists(String),
}

/// Filters for the fighter list endpoint. All present filters must match.
#[derive(Debug, Clone, Default)]
pub struct FighterFilter {
    /// Exact match.
    pub weight_class: Option<String>,
    /// Case-insensitive substring.
    pub country: Option<String>,
    /// Case-insensitive substring over name and nickname.
    pub q: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoreData {
    fighters: BTreeMap<String, Fighter>,
    events: BTreeMap<String, UfcEvent>,
    rankings: Option<RankingsSnapshot>,
}

/// JSON-file-backed document store.
///
/// Everything lives in memory behind one `RwLock`; every mutation rewrites
/// the whole backing file while still holding the write lock, so the file
/// always reflects the last completed mutation. There are no
/// cross-collection transactions; a single write is the atomicity unit.
pub struct DocStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl DocStore {
    /// Open the store, loading the backing file when it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            StoreData::default()
        };
        debug!(
            path = %path.display(),
            fighters = data.fighters.len(),
            events = data.events.len(),
            "store opened"
        );
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    // Fighters

    pub async fn insert_fighter(&self, fighter: Fighter) -> Result<Fighter, StoreError> {
        let mut data = self.data.write().await;
        if data.fighters.contains_key(&fighter.external_id) {
            return Err(StoreError::AlreadyExists(fighter.external_id));
        }
        data.fighters
            .insert(fighter.external_id.clone(), fighter.clone());
        self.persist(&data)?;
        Ok(fighter)
    }

    /// Upsert a batch keyed by `external_id`; existing records keep their
    /// original `created_at`.
    pub async fn upsert_fighters(&self, fighters: Vec<Fighter>) -> Result<usize, StoreError> {
        let mut data = self.data.write().await;
        let count = fighters.len();
        for mut fighter in fighters {
            if let Some(existing) = data.fighters.get(&fighter.external_id) {
                fighter.created_at = existing.created_at;
            }
            data.fighters
                .insert(fighter.external_id.clone(), fighter);
        }
        self.persist(&data)?;
        Ok(count)
    }

    pub async fn update_fighter(
        &self,
        external_id: &str,
        update: FighterUpdate,
    ) -> Result<Option<Fighter>, StoreError> {
        let mut data = self.data.write().await;
        let Some(fighter) = data.fighters.get_mut(external_id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            fighter.name = name;
        }
        if let Some(weight_class) = update.weight_class {
            fighter.weight_class = weight_class;
        }
        if let Some(country) = update.country {
            fighter.country = Some(country);
        }
        if let Some(wins) = update.wins {
            fighter.wins = wins;
        }
        if let Some(losses) = update.losses {
            fighter.losses = losses;
        }
        if let Some(draws) = update.draws {
            fighter.draws = draws;
        }
        if let Some(nickname) = update.nickname {
            fighter.nickname = Some(nickname);
        }
        if let Some(status) = update.status {
            fighter.status = Some(status);
        }
        if let Some(image_url) = update.image_url {
            fighter.image_url = Some(image_url);
        }
        fighter.updated_at = Utc::now();

        let updated = fighter.clone();
        self.persist(&data)?;
        Ok(Some(updated))
    }

    pub async fn delete_fighter(&self, external_id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        let removed = data.fighters.remove(external_id).is_some();
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    pub async fn get_fighter(&self, external_id: &str) -> Option<Fighter> {
        self.data.read().await.fighters.get(external_id).cloned()
    }

    pub async fn list_fighters(&self, filter: &FighterFilter) -> Vec<Fighter> {
        let data = self.data.read().await;
        let mut fighters: Vec<Fighter> = data
            .fighters
            .values()
            .filter(|f| matches_filter(f, filter))
            .cloned()
            .collect();
        fighters.sort_by(|a, b| a.name.cmp(&b.name));
        fighters
    }

    /// Look a fighter up by id, then fall back to name matching against the
    /// slug for records synced before the id scheme settled.
    pub async fn find_fighter_by_slug(&self, slug: &str) -> Option<Fighter> {
        let data = self.data.read().await;
        if let Some(fighter) = data.fighters.get(slug) {
            return Some(fighter.clone());
        }

        let slug_words: Vec<String> = slug
            .split('-')
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        if slug_words.is_empty() {
            return None;
        }
        let slug_name = slug_words.join(" ");

        if let Some(fighter) = data
            .fighters
            .values()
            .find(|f| f.name.to_lowercase() == slug_name)
        {
            return Some(fighter.clone());
        }

        data.fighters
            .values()
            .find(|f| {
                let name = f.name.to_lowercase();
                slug_words.iter().all(|w| name.contains(w.as_str()))
            })
            .cloned()
    }

    // Events

    /// Upsert event headers from a list scrape. Existing events keep their
    /// fights, details timestamp, and `created_at`.
    pub async fn upsert_event_headers(&self, raw: Vec<RawEvent>) -> Result<usize, StoreError> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let count = raw.len();
        for event in raw {
            match data.events.get_mut(&event.ufc_id) {
                Some(existing) => {
                    existing.name = event.name;
                    existing.date = event.date;
                    existing.is_upcoming = event.is_upcoming;
                    // Optional header fields only overwrite when the new
                    // scrape actually produced a value.
                    if event.subtitle.is_some() {
                        existing.subtitle = event.subtitle;
                    }
                    if event.location.is_some() {
                        existing.location = event.location;
                    }
                    if event.type_tag.is_some() {
                        existing.type_tag = event.type_tag;
                    }
                    existing.updated_at = now;
                }
                None => {
                    data.events.insert(
                        event.ufc_id.clone(),
                        UfcEvent {
                            ufc_id: event.ufc_id,
                            name: event.name,
                            subtitle: event.subtitle,
                            date: event.date,
                            location: event.location,
                            type_tag: event.type_tag,
                            is_upcoming: event.is_upcoming,
                            fights: vec![],
                            last_details_refreshed_at: None,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
        }
        self.persist(&data)?;
        Ok(count)
    }

    pub async fn get_event(&self, ufc_id: &str) -> Option<UfcEvent> {
        self.data.read().await.events.get(ufc_id).cloned()
    }

    /// Events dated now or later, soonest first.
    pub async fn upcoming_events(&self) -> Vec<UfcEvent> {
        let now = Utc::now();
        let data = self.data.read().await;
        let mut events: Vec<UfcEvent> = data
            .events
            .values()
            .filter(|e| e.date >= now)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        events
    }

    /// Events dated before now, most recent first, capped at `limit`.
    pub async fn past_events(&self, limit: usize) -> Vec<UfcEvent> {
        let now = Utc::now();
        let data = self.data.read().await;
        let mut events: Vec<UfcEvent> = data
            .events
            .values()
            .filter(|e| e.date < now)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        events.truncate(limit);
        events
    }

    /// Event ids for a bulk details refresh, optionally restricted by the
    /// stored `is_upcoming` flag.
    pub async fn event_refresh_targets(&self, is_upcoming: Option<bool>) -> Vec<String> {
        let data = self.data.read().await;
        data.events
            .values()
            .filter(|e| is_upcoming.map_or(true, |want| e.is_upcoming == want))
            .map(|e| e.ufc_id.clone())
            .collect()
    }

    /// Overwrite an event's fight card wholesale and stamp the refresh time.
    pub async fn set_event_fights(
        &self,
        ufc_id: &str,
        fights: Vec<crate::models::EventFight>,
    ) -> Result<Option<UfcEvent>, StoreError> {
        let mut data = self.data.write().await;
        let Some(event) = data.events.get_mut(ufc_id) else {
            return Ok(None);
        };
        let now = Utc::now();
        event.fights = fights;
        event.last_details_refreshed_at = Some(now);
        event.updated_at = now;
        let updated = event.clone();
        self.persist(&data)?;
        Ok(Some(updated))
    }

    // Rankings

    /// Replace the whole snapshot; stale divisions never survive a refresh.
    pub async fn replace_rankings(
        &self,
        divisions: Vec<Division>,
    ) -> Result<RankingsSnapshot, StoreError> {
        let mut data = self.data.write().await;
        let snapshot = RankingsSnapshot {
            divisions,
            last_refreshed_at: Utc::now(),
        };
        data.rankings = Some(snapshot.clone());
        self.persist(&data)?;
        Ok(snapshot)
    }

    pub async fn rankings(&self) -> Option<RankingsSnapshot> {
        self.data.read().await.rankings.clone()
    }

    /// Case-insensitive containment match over division names.
    pub async fn find_division(&self, name: &str) -> Option<Division> {
        let needle = name.to_lowercase();
        let data = self.data.read().await;
        data.rankings.as_ref().and_then(|snapshot| {
            snapshot
                .divisions
                .iter()
                .find(|d| d.division.to_lowercase().contains(&needle))
                .cloned()
        })
    }
}

fn matches_filter(fighter: &Fighter, filter: &FighterFilter) -> bool {
    if let Some(weight_class) = &filter.weight_class {
        if &fighter.weight_class != weight_class {
            return false;
        }
    }
    if let Some(country) = &filter.country {
        let needle = country.to_lowercase();
        let matched = fighter
            .country
            .as_ref()
            .is_some_and(|c| c.to_lowercase().contains(&needle));
        if !matched {
            return false;
        }
    }
    if let Some(q) = &filter.q {
        let needle = q.to_lowercase();
        let in_name = fighter.name.to_lowercase().contains(&needle);
        let in_nickname = fighter
            .nickname
            .as_ref()
            .is_some_and(|n| n.to_lowercase().contains(&needle));
        if !(in_name || in_nickname) {
            return false;
        }
    }
    true
}
