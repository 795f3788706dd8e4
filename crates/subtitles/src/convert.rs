//! WebVTT to target-format conversion.
//!
//! Conversion works on one folder at a time and only touches its direct
//! `.vtt` children, so calling it again on an already converted folder
//! leaves it unchanged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SubtitleError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            other => Err(SubtitleError::Other(format!(
                "unsupported subtitle format: {other}"
            ))),
        }
    }
}

#[async_trait]
pub trait SubtitleConverter: Send + Sync {
    /// Converts every downloaded subtitle directly inside `folder`.
    async fn convert(&self, folder: &Path, format: SubtitleFormat) -> Result<(), SubtitleError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebVttConverter;

static TIMING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{2}:\d{2}\.\d{3})\s+-->\s+((?:\d+:)?\d{2}:\d{2}\.\d{3})").unwrap()
});
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z0-9]+)[^>]*>").unwrap());

impl WebVttConverter {
    async fn vtt_files(folder: &Path) -> Result<Vec<PathBuf>, SubtitleError> {
        let mut entries = match tokio::fs::read_dir(folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && path.extension().is_some_and(|ext| ext == "vtt")
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl SubtitleConverter for WebVttConverter {
    async fn convert(&self, folder: &Path, format: SubtitleFormat) -> Result<(), SubtitleError> {
        if format == SubtitleFormat::Vtt {
            return Ok(());
        }

        let files = Self::vtt_files(folder).await?;
        if files.is_empty() {
            debug!(folder = %folder.display(), "Nothing to convert");
            return Ok(());
        }

        for path in &files {
            let content = tokio::fs::read_to_string(path).await?;
            let target = path.with_extension(format.extension());
            tokio::fs::write(&target, vtt_to_srt(&content)).await?;
            tokio::fs::remove_file(path).await?;
            debug!(from = %path.display(), to = %target.display(), "Converted subtitle");
        }

        info!(
            folder = %folder.display(),
            count = files.len(),
            "Converted subtitles to {format}"
        );
        Ok(())
    }
}

fn srt_timestamp(vtt: &str) -> String {
    let with_hours = if vtt.matches(':').count() == 1 {
        format!("00:{vtt}")
    } else {
        vtt.to_string()
    };
    with_hours.replace('.', ",")
}

fn strip_markup(line: &str) -> String {
    TAG_REGEX
        .replace_all(line, |caps: &regex::Captures| match &caps[2] {
            tag @ ("i" | "b" | "u") => format!("<{}{tag}>", &caps[1]),
            _ => String::new(),
        })
        .into_owned()
}

pub fn vtt_to_srt(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n");
    let mut output = String::with_capacity(normalized.len());
    let mut index = 0usize;

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(timing_pos) = lines.iter().position(|l| TIMING_REGEX.is_match(l)) else {
            // Header, NOTE, STYLE and REGION blocks carry no timing line.
            continue;
        };
        let Some(caps) = TIMING_REGEX.captures(lines[timing_pos]) else {
            continue;
        };

        index += 1;
        output.push_str(&index.to_string());
        output.push('\n');
        output.push_str(&srt_timestamp(&caps[1]));
        output.push_str(" --> ");
        output.push_str(&srt_timestamp(&caps[2]));
        output.push('\n');
        for text in &lines[timing_pos + 1..] {
            output.push_str(&strip_markup(text));
            output.push('\n');
        }
        output.push('\n');
    }

    output
}
