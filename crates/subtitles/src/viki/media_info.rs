use std::path::Path;

use serde_json::Value;
use tracing::{debug, error};

use crate::credentials::CookieStore;
use crate::error::SubtitleError;
use crate::session::{HttpClient, RequestContext};
use crate::viki::config::VikiConfig;
use crate::viki::models::MediaInfo;

/// Body marker the API returns once the session cookies are no longer valid.
pub const RATE_LIMIT_MARKER: &str = "Too Many Requests";

pub const SESSION_COOKIE: &str = "session__id";
pub const DEVICE_COOKIE: &str = "device_id";

pub struct MediaInfoFetcher<'a> {
    client: &'a dyn HttpClient,
    config: &'a VikiConfig,
}

impl<'a> MediaInfoFetcher<'a> {
    pub fn new(client: &'a dyn HttpClient, config: &'a VikiConfig) -> Self {
        Self { client, config }
    }

    /// Headers the video endpoint expects, derived from the player config and cookies.
    pub fn request_context(
        config: &VikiConfig,
        credentials: &CookieStore,
    ) -> Result<RequestContext, SubtitleError> {
        Ok(RequestContext::new(config.request_timeout())
            .with_header("x-viki-app-ver", &config.player_version)
            .with_header("x-client-user-agent", &config.user_agent)
            .with_header("x-viki-as-id", credentials.require(SESSION_COOKIE)?)
            .with_header("x-viki-device-id", credentials.require(DEVICE_COOKIE)?))
    }

    /// Fetches playback metadata for one video.
    ///
    /// `Ok(None)` means the platform answered without a `video` object; the
    /// caller skips that video. Expired credentials and non-OK responses
    /// are errors.
    pub async fn fetch(
        &self,
        context: &RequestContext,
        video_id: &str,
        filename: &str,
    ) -> Result<Option<MediaInfo>, SubtitleError> {
        let url = self.config.video_url(video_id);
        let response = self.client.get(&url, context).await?;

        if !response.is_ok() {
            error!("{}", response.body);
            return Err(SubtitleError::Status {
                status: response.status,
                body: response.body,
            });
        }

        if response.body.contains(RATE_LIMIT_MARKER) {
            debug!("{}", response.body);
            error!("Too Many Requests! Login access token is expired! Please re-download cookies");
            return Err(SubtitleError::AuthExpired);
        }

        let data: Value = response.json()?;
        if data.get("video").is_none() {
            let name = Path::new(filename)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.to_string());
            let message = match data.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "unknown error".to_string(),
            };
            error!(video_id = %video_id, "{name}\nError: {message}");
            return Ok(None);
        }

        debug!("media_info: {}", data);
        Ok(Some(serde_json::from_value(data)?))
    }
}
