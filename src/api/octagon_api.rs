use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::models::Fighter;

/// One fighter record from the public fighters directory. Record counts come
/// over the wire as strings ("34 wins" style values appear too).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryFighter {
    pub name: String,
    pub category: String,
    pub place_of_birth: String,
    pub wins: String,
    pub losses: String,
    pub draws: String,
    pub status: String,
    pub img_url: String,
    pub nickname: String,
}

/// Client for the octagon-api.com fighters directory.
pub struct OctagonApiClient {
    url: String,
    client: reqwest::Client,
}

impl OctagonApiClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the whole directory, keyed by fighter slug.
    pub async fn fetch_fighters(&self) -> Result<BTreeMap<String, DirectoryFighter>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to fetch the fighters directory")?;

        if !response.status().is_success() {
            anyhow::bail!("Fighters directory returned error: {}", response.status());
        }

        let fighters: BTreeMap<String, DirectoryFighter> = response
            .json()
            .await
            .context("Failed to parse the fighters directory response")?;

        Ok(fighters)
    }
}

/// Map a raw directory record onto a [`Fighter`], keyed by its slug.
pub fn normalize_directory_fighter(slug: &str, record: &DirectoryFighter) -> Fighter {
    let now = Utc::now();
    Fighter {
        external_id: slug.to_string(),
        name: record.name.trim().to_string(),
        weight_class: non_empty(&record.category).unwrap_or_else(|| "Unknown".to_string()),
        country: non_empty(&record.place_of_birth),
        wins: parse_count(&record.wins),
        losses: parse_count(&record.losses),
        draws: parse_count(&record.draws),
        nickname: non_empty(&record.nickname),
        status: non_empty(&record.status),
        image_url: non_empty(&record.img_url),
        created_at: now,
        updated_at: now,
    }
}

/// Leading-integer parse with a 0 default; tolerates values like "34 wins".
fn parse_count(raw: &str) -> i32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
