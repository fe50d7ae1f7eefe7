use std::path::PathBuf;
use std::time::Duration;

/// Settings for the outbound HTML fetch layer.
///
/// `disabled` is the scraping kill switch: when set, the fetch layer fails
/// immediately without any network I/O, so a deployment can serve cached
/// data only.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub disabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            base_url: "https://www.ufc.com".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            timeout: Duration::from_secs(10),
            attempts: 3,
            base_delay_ms: 700,
        }
    }
}

/// Application-level configuration shared by the CLI and the web server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scrape: ScrapeConfig,
    pub fighters_api_url: String,
    pub data_file: PathBuf,
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from the environment (after dotenv has run).
    pub fn from_env() -> Self {
        let mut scrape = ScrapeConfig::default();

        scrape.disabled = std::env::var("DISABLE_UFC_SCRAPING")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if let Ok(base_url) = std::env::var("UFC_BASE_URL") {
            scrape.base_url = base_url;
        }

        let fighters_api_url = std::env::var("FIGHTERS_API_URL")
            .unwrap_or_else(|_| "https://api.octagon-api.com/fighters".to_string());

        let data_file = std::env::var("UFC_DATA_FILE")
            .unwrap_or_else(|_| "cache/ufc_data.json".to_string())
            .into();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5050);

        Self {
            scrape,
            fighters_api_url,
            data_file,
            port,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scrape: ScrapeConfig::default(),
            fighters_api_url: "https://api.octagon-api.com/fighters".to_string(),
            data_file: "cache/ufc_data.json".into(),
            port: 5050,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_defaults() {
        let config = ScrapeConfig::default();
        assert!(!config.disabled);
        assert_eq!(config.base_url, "https://www.ufc.com");
        assert_eq!(config.attempts, 3);
        assert_eq!(config.base_delay_ms, 700);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
