use serde::Deserialize;

use crate::utils::{deserialize_null_default, deserialize_number_or_string};

/// JSON-LD block embedded in a title's landing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub name: String,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl VideoMetadata {
    pub fn title(&self) -> &str {
        self.name.trim()
    }

    pub fn release_year(&self) -> Option<&str> {
        self.date_published
            .as_deref()
            .and_then(|date| date.get(..4))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    pub video: VideoInfo,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub subtitles: Vec<SubtitleTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub hardsubs: bool,
}

/// Partial tracks may come without a `src`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleTrack {
    #[serde(rename = "srclang")]
    pub language_code: String,
    #[serde(rename = "percentage", default)]
    pub completeness_percentage: Option<f64>,
    #[serde(rename = "src", default)]
    pub source_url: Option<String>,
}

impl SubtitleTrack {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.completeness_percentage == Some(100.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodesResponse {
    #[serde(default)]
    pub response: Vec<EpisodeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeRecord {
    pub id: String,
    #[serde(deserialize_with = "deserialize_number_or_string")]
    pub number: u32,
    #[serde(default)]
    pub container: EpisodeContainer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodeContainer {
    #[serde(default)]
    pub planned_episodes: Option<u32>,
}
