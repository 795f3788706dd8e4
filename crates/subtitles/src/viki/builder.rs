use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::convert::{SubtitleConverter, WebVttConverter};
use crate::credentials::CookieStore;
use crate::error::SubtitleError;
use crate::options::DownloadOptions;
use crate::session::{HttpClient, RequestContext, Session, default_client};
use crate::transport::{DownloadReport, FileTransport, HttpTransport};
use crate::utils::{capture_group_1_or_validation, sanitize_filename};
use crate::viki::config::VikiConfig;
use crate::viki::episodes::SeriesEpisodeEnumerator;
use crate::viki::media_info::MediaInfoFetcher;
use crate::viki::models::VideoMetadata;
use crate::viki::orchestrator::DownloadOrchestrator;
use crate::viki::selector::SubtitleTrackSelector;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?viki\.com/(?:movies|tv)/([0-9]+[a-z])(?:[-/?#]|$)").unwrap()
});
static LD_JSON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\{"@context":.+\}\})"#).unwrap());
static PAGE_PROPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\{"props":\{.*\})"#).unwrap());

const WATCH_NOW_POINTER: &str = "/props/pageProps/containerJson/watch_now/id";

/// Subtitle downloader for viki.com movies and series.
pub struct Viki {
    client: Box<dyn HttpClient>,
    transport: Box<dyn FileTransport>,
    converter: Box<dyn SubtitleConverter>,
    config: VikiConfig,
    options: DownloadOptions,
    credentials: CookieStore,
}

impl Viki {
    pub fn new(
        session: Session,
        config: VikiConfig,
        options: DownloadOptions,
        credentials: CookieStore,
    ) -> Self {
        let transport = HttpTransport::new(session.client().clone(), config.download_concurrency);
        Self::with_collaborators(
            Box::new(session),
            Box::new(transport),
            Box::new(WebVttConverter),
            config,
            options,
            credentials,
        )
    }

    pub async fn from_cookie_file(
        cookies_path: impl Into<PathBuf>,
        config: VikiConfig,
        options: DownloadOptions,
    ) -> Result<Self, SubtitleError> {
        let credentials = CookieStore::load(cookies_path).await?;
        let mut session = Session::new(default_client()?);
        session.add_cookies(credentials.cookies().clone());
        Ok(Self::new(session, config, options, credentials))
    }

    pub fn with_collaborators(
        client: Box<dyn HttpClient>,
        transport: Box<dyn FileTransport>,
        converter: Box<dyn SubtitleConverter>,
        config: VikiConfig,
        options: DownloadOptions,
        credentials: CookieStore,
    ) -> Self {
        Self {
            client,
            transport,
            converter,
            config,
            options,
            credentials,
        }
    }

    pub fn is_url_valid(url: &str) -> bool {
        URL_REGEX.is_match(url)
    }

    /// Entry point. Expired credentials are deleted before the error is returned.
    pub async fn run(&self, url: &str) -> Result<Option<DownloadReport>, SubtitleError> {
        match self.dispatch(url).await {
            Err(SubtitleError::AuthExpired) => {
                self.credentials.invalidate().await?;
                Err(SubtitleError::AuthExpired)
            }
            other => other,
        }
    }

    async fn dispatch(&self, url: &str) -> Result<Option<DownloadReport>, SubtitleError> {
        let context = RequestContext::new(self.config.request_timeout());
        let response = self.client.get(url, &context).await?;
        if !response.is_ok() {
            error!("{}", response.body);
            return Ok(None);
        }

        let ld_json = capture_group_1_or_validation(&LD_JSON_REGEX, &response.body, "page metadata")?;
        let metadata: VideoMetadata = serde_json::from_str(ld_json)?;
        debug!(?metadata, "Page metadata");

        if url.contains("/movies") {
            let props = capture_group_1_or_validation(&PAGE_PROPS_REGEX, &response.body, "page props")?;
            let props: Value = serde_json::from_str(props)?;
            let video_id = props
                .pointer(WATCH_NOW_POINTER)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    SubtitleError::ValidationError("page props carry no playable video id".into())
                })?;
            self.movie_metadata(&metadata, video_id).await
        } else {
            self.series_metadata(&metadata).await
        }
    }

    fn orchestrator(&self) -> DownloadOrchestrator<'_> {
        DownloadOrchestrator::new(
            self.transport.as_ref(),
            self.converter.as_ref(),
            self.options.subtitle_format,
        )
    }

    pub async fn movie_metadata(
        &self,
        metadata: &VideoMetadata,
        video_id: &str,
    ) -> Result<Option<DownloadReport>, SubtitleError> {
        let title = metadata.title();
        let release_year = metadata.release_year().ok_or_else(|| {
            SubtitleError::ValidationError(format!("{title} has no release date"))
        })?;
        info!("{title} ({release_year})");

        let name = sanitize_filename(&format!("{title}.{release_year}"));
        let folder_path = self.options.download_path.join(&name);
        let filename = format!("{name}.WEB-DL.{}.vtt", self.config.platform);

        let context = MediaInfoFetcher::request_context(&self.config, &self.credentials)?;
        let fetcher = MediaInfoFetcher::new(self.client.as_ref(), &self.config);
        let media_info = fetcher.fetch(&context, video_id, &filename).await?;

        let selector = SubtitleTrackSelector::new(&self.options.languages);
        let (descriptors, folders) = selector
            .select(media_info.as_ref(), &folder_path, &filename)
            .await?
            .into_parts();

        if !descriptors.is_empty() {
            info!("Download: {filename}");
        }
        self.orchestrator()
            .run(descriptors, &folders, &folder_path)
            .await
    }

    pub async fn series_metadata(
        &self,
        metadata: &VideoMetadata,
    ) -> Result<Option<DownloadReport>, SubtitleError> {
        let enumerator =
            SeriesEpisodeEnumerator::new(self.client.as_ref(), &self.config, &self.options);
        let listing = enumerator.enumerate(metadata).await?;

        let context = MediaInfoFetcher::request_context(&self.config, &self.credentials)?;
        let fetcher = MediaInfoFetcher::new(self.client.as_ref(), &self.config);
        let selector = SubtitleTrackSelector::new(&self.options.languages);
        let (descriptors, folders) = enumerator
            .collect(&listing, &fetcher, &selector, &context)
            .await?;

        self.orchestrator()
            .run(descriptors, &folders, &listing.folder_path)
            .await
    }
}
