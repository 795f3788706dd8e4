use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::convert::SubtitleFormat;
use crate::language::RequestedLanguages;

/// What the user asked to fetch, already parsed.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub download_path: PathBuf,
    pub languages: RequestedLanguages,
    pub subtitle_format: SubtitleFormat,
    /// Empty means every season.
    pub seasons: BTreeSet<u32>,
    /// Empty means every episode.
    pub episodes: BTreeSet<u32>,
    pub last_episode: bool,
}

impl DownloadOptions {
    pub fn new(download_path: impl Into<PathBuf>, languages: RequestedLanguages) -> Self {
        Self {
            download_path: download_path.into(),
            languages,
            subtitle_format: SubtitleFormat::default(),
            seasons: BTreeSet::new(),
            episodes: BTreeSet::new(),
            last_episode: false,
        }
    }

    pub fn wants_episode(&self, season_index: u32, episode_number: u32) -> bool {
        (self.seasons.is_empty() || self.seasons.contains(&season_index))
            && (self.episodes.is_empty() || self.episodes.contains(&episode_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_episode() {
        let mut options = DownloadOptions::new("/tmp", RequestedLanguages::all());
        assert!(options.wants_episode(3, 9));

        options.seasons = [2].into();
        assert!(options.wants_episode(2, 9));
        assert!(!options.wants_episode(1, 9));

        options.episodes = [1, 4].into();
        assert!(options.wants_episode(2, 4));
        assert!(!options.wants_episode(2, 5));
    }
}
