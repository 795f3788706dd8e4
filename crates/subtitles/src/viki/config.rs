use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_UA;

/// Endpoints and identifiers for the Viki web API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VikiConfig {
    /// Label used in output filenames.
    pub platform: String,
    /// Per-video metadata endpoint, `{video_id}` is substituted.
    pub videos_api: String,
    /// Episode listing endpoint, `{content_id}` and `{time}` are substituted.
    pub episodes_api: String,
    pub player_version: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub download_concurrency: usize,
}

impl Default for VikiConfig {
    fn default() -> Self {
        Self {
            platform: "Viki".to_string(),
            videos_api: "https://www.viki.com/api/videos/{video_id}".to_string(),
            episodes_api: "https://api.viki.io/v4/series/{content_id}/episodes.json?token=undefined&direction=asc&with_upcoming=false&sort=number&page=1&per_page=1000&app=100000a&t={time}".to_string(),
            player_version: "6.11.3".to_string(),
            user_agent: DEFAULT_UA.to_string(),
            request_timeout_secs: 5,
            download_concurrency: 4,
        }
    }
}

impl VikiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn video_url(&self, video_id: &str) -> String {
        self.videos_api.replace("{video_id}", video_id)
    }

    pub fn episodes_url(&self, content_id: &str, time: i64) -> String {
        self.episodes_api
            .replace("{content_id}", content_id)
            .replace("{time}", &time.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_templates() {
        let config = VikiConfig::default();
        assert_eq!(
            config.video_url("1234v"),
            "https://www.viki.com/api/videos/1234v"
        );
        let url = config.episodes_url("50c", 1700000000);
        assert!(url.starts_with("https://api.viki.io/v4/series/50c/episodes.json"));
        assert!(url.ends_with("&t=1700000000"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: VikiConfig = serde_json::from_str(r#"{"player_version": "7.0.0"}"#).unwrap();
        assert_eq!(config.player_version, "7.0.0");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.platform, "Viki");
    }
}
