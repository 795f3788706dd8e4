use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::error::SubtitleError;
use crate::options::DownloadOptions;
use crate::session::{HttpClient, RequestContext};
use crate::subtitle::{LanguageFolderSet, SubtitleDescriptor};
use crate::utils::{capture_group_1_or_validation, sanitize_filename};
use crate::viki::config::VikiConfig;
use crate::viki::media_info::MediaInfoFetcher;
use crate::viki::models::{EpisodeRecord, EpisodesResponse, VideoMetadata};
use crate::viki::selector::{SelectionOutcome, SubtitleTrackSelector};

static SEASON_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.+) Season (\d+)").unwrap());
static CONTENT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^\-]+)").unwrap());

/// How the fetched listing compares with the declared season size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    LastEpisodeOnly,
    EpisodeCountChanged { current: usize },
    FullSeason,
}

#[derive(Debug, Clone)]
pub struct SeasonListing {
    pub title: String,
    pub season_index: u32,
    pub content_id: String,
    pub planned_episodes: u32,
    pub reconciliation: Reconciliation,
    pub folder_path: PathBuf,
    pub episodes: Vec<EpisodeRecord>,
}

pub struct SeriesEpisodeEnumerator<'a> {
    client: &'a dyn HttpClient,
    config: &'a VikiConfig,
    options: &'a DownloadOptions,
}

impl<'a> SeriesEpisodeEnumerator<'a> {
    pub fn new(
        client: &'a dyn HttpClient,
        config: &'a VikiConfig,
        options: &'a DownloadOptions,
    ) -> Self {
        Self {
            client,
            config,
            options,
        }
    }

    /// `https://www.viki.com/tv/37350c-show-y` -> `37350c`
    pub fn content_id(metadata: &VideoMetadata) -> Result<String, SubtitleError> {
        let url = metadata
            .url
            .as_deref()
            .ok_or_else(|| SubtitleError::ValidationError("series metadata has no url".into()))?;
        let basename = match url::Url::parse(url) {
            Ok(parsed) => parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_owned)
                .unwrap_or_default(),
            Err(_) => url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_owned(),
        };
        capture_group_1_or_validation(&CONTENT_ID_REGEX, &basename, "content id")
            .map(str::to_owned)
    }

    /// Splits `"Show Y Season 2"` into `("Show Y", 2)`; no suffix means season 1.
    pub fn parse_season(name: &str) -> (String, u32) {
        SEASON_REGEX
            .captures(name)
            .and_then(|caps| {
                let index = caps.get(2)?.as_str().parse().ok()?;
                Some((caps.get(1)?.as_str().trim().to_string(), index))
            })
            .unwrap_or_else(|| (name.trim().to_string(), 1))
    }

    pub fn reconcile(
        planned_episodes: u32,
        mut episodes: Vec<EpisodeRecord>,
        last_episode: bool,
    ) -> (Reconciliation, Vec<EpisodeRecord>) {
        if last_episode {
            if let Some(last) = episodes.pop() {
                episodes = vec![last];
            }
            return (Reconciliation::LastEpisodeOnly, episodes);
        }

        let current = episodes.len();
        if current != 0 && current != planned_episodes as usize {
            (Reconciliation::EpisodeCountChanged { current }, episodes)
        } else {
            (Reconciliation::FullSeason, episodes)
        }
    }

    async fn fetch_episodes(&self, content_id: &str) -> Result<Vec<EpisodeRecord>, SubtitleError> {
        // The endpoint rejects stale timestamps.
        let url = self
            .config
            .episodes_url(content_id, chrono::Utc::now().timestamp());
        let context = RequestContext::new(self.config.request_timeout());
        let response = self.client.get(&url, &context).await?;

        if !response.is_ok() {
            error!("{}", response.body);
            return Err(SubtitleError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let listing: EpisodesResponse = response.json()?;
        if listing.response.is_empty() {
            error!("{}", response.body);
            return Err(SubtitleError::EmptySeason(content_id.to_string()));
        }
        Ok(listing.response)
    }

    pub async fn enumerate(&self, metadata: &VideoMetadata) -> Result<SeasonListing, SubtitleError> {
        let content_id = Self::content_id(metadata)?;
        let (title, season_index) = Self::parse_season(&metadata.name);
        info!("{title} Season {season_index}");

        let episodes = self.fetch_episodes(&content_id).await?;
        let planned_episodes = episodes
            .first()
            .and_then(|e| e.container.planned_episodes)
            .unwrap_or(episodes.len() as u32);

        let (reconciliation, episodes) =
            Self::reconcile(planned_episodes, episodes, self.options.last_episode);
        match reconciliation {
            Reconciliation::LastEpisodeOnly => info!(
                "Season {season_index} total: {planned_episodes} episode(s)\tdownload season {season_index} last episode"
            ),
            Reconciliation::EpisodeCountChanged { current } => info!(
                "Season {season_index} total: {planned_episodes} episode(s)\tupdate to episode {current}\tdownload all episodes"
            ),
            Reconciliation::FullSeason => info!(
                "Season {season_index} total: {planned_episodes} episode(s)\tdownload all episodes"
            ),
        }

        let folder_name = sanitize_filename(&format!("{title}.S{season_index:02}"));
        Ok(SeasonListing {
            folder_path: self.options.download_path.join(folder_name),
            title,
            season_index,
            content_id,
            planned_episodes,
            reconciliation,
            episodes,
        })
    }

    pub fn episode_filename(&self, listing: &SeasonListing, episode_number: u32) -> String {
        let name = sanitize_filename(&format!(
            "{}.S{:02}E{:02}",
            listing.title, listing.season_index, episode_number
        ));
        format!("{name}.WEB-DL.{}.vtt", self.config.platform)
    }

    /// Walks the listing in order and gathers every selected subtitle.
    ///
    /// The season folder is recreated from scratch. The first episode that
    /// yields no subtitles ends the walk; later episodes are not requested.
    pub async fn collect(
        &self,
        listing: &SeasonListing,
        fetcher: &MediaInfoFetcher<'_>,
        selector: &SubtitleTrackSelector<'_>,
        context: &RequestContext,
    ) -> Result<(Vec<SubtitleDescriptor>, LanguageFolderSet), SubtitleError> {
        if tokio::fs::try_exists(&listing.folder_path).await? {
            debug!(folder = %listing.folder_path.display(), "Removing previous season folder");
            tokio::fs::remove_dir_all(&listing.folder_path).await?;
        }

        let mut descriptors = Vec::new();
        let mut folders = LanguageFolderSet::new();

        for episode in &listing.episodes {
            if !self
                .options
                .wants_episode(listing.season_index, episode.number)
            {
                continue;
            }

            let filename = self.episode_filename(listing, episode.number);
            let media_info = fetcher.fetch(context, &episode.id, &filename).await?;
            match selector
                .select(media_info.as_ref(), &listing.folder_path, &filename)
                .await?
            {
                SelectionOutcome::Found(selection) => {
                    descriptors.extend(selection.descriptors);
                    folders.extend(selection.folders);
                }
                outcome => {
                    warn!(
                        episode = episode.number,
                        ?outcome,
                        "No subtitles for episode, treating it as the end of the season"
                    );
                    break;
                }
            }
        }

        Ok((descriptors, folders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viki::models::EpisodeContainer;

    fn episode(number: u32) -> EpisodeRecord {
        EpisodeRecord {
            id: format!("{number}v"),
            number,
            container: EpisodeContainer {
                planned_episodes: Some(10),
            },
        }
    }

    fn metadata(name: &str, url: &str) -> VideoMetadata {
        VideoMetadata {
            name: name.to_string(),
            date_published: None,
            url: Some(url.to_string()),
        }
    }

    #[test]
    fn test_parse_season() {
        assert_eq!(
            SeriesEpisodeEnumerator::parse_season("Show Y Season 2"),
            ("Show Y".to_string(), 2)
        );
        assert_eq!(
            SeriesEpisodeEnumerator::parse_season(" Show Z "),
            ("Show Z".to_string(), 1)
        );
    }

    #[test]
    fn test_content_id() {
        let id = SeriesEpisodeEnumerator::content_id(&metadata(
            "Show Y",
            "https://www.viki.com/tv/37350c-show-y",
        ))
        .unwrap();
        assert_eq!(id, "37350c");

        let id = SeriesEpisodeEnumerator::content_id(&metadata("Show Y", "/tv/123c-abc/")).unwrap();
        assert_eq!(id, "123c");

        let mut no_url = metadata("Show Y", "");
        no_url.url = None;
        assert!(SeriesEpisodeEnumerator::content_id(&no_url).is_err());
    }

    #[test]
    fn test_reconcile_full_season() {
        let episodes: Vec<_> = (1..=10).map(episode).collect();
        let (mode, candidates) = SeriesEpisodeEnumerator::reconcile(10, episodes, false);
        assert_eq!(mode, Reconciliation::FullSeason);
        assert_eq!(candidates.len(), 10);
    }

    #[test]
    fn test_reconcile_count_changed_keeps_all() {
        let episodes: Vec<_> = (1..=5).map(episode).collect();
        let (mode, candidates) = SeriesEpisodeEnumerator::reconcile(10, episodes, false);
        assert_eq!(mode, Reconciliation::EpisodeCountChanged { current: 5 });
        assert_eq!(candidates.len(), 5);
    }

    #[test]
    fn test_reconcile_last_episode() {
        let episodes: Vec<_> = (1..=7).map(episode).collect();
        let (mode, candidates) = SeriesEpisodeEnumerator::reconcile(10, episodes, true);
        assert_eq!(mode, Reconciliation::LastEpisodeOnly);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].number, 7);
    }
}
