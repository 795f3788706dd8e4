use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, error, warn};

use crate::error::SubtitleError;
use crate::language::{RequestedLanguages, normalize_language_code, report_missing_languages};
use crate::subtitle::{LanguageFolderSet, SubtitleDescriptor, language_filename};
use crate::viki::models::MediaInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoneReason {
    /// Tracks exist but none is both complete and requested.
    LanguagesUnavailable { missing: Vec<String> },
    /// Subtitles are burned into the video stream.
    HardsubsOnly,
    /// No tracks at all, usually a subscription restriction.
    AccessRestricted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub descriptors: Vec<SubtitleDescriptor>,
    pub folders: LanguageFolderSet,
    pub available_languages: BTreeSet<String>,
    pub missing_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Found(Selection),
    NoneAvailable(NoneReason),
    /// The metadata request returned no `video` object.
    NotYetReleased,
}

impl SelectionOutcome {
    pub fn into_parts(self) -> (Vec<SubtitleDescriptor>, LanguageFolderSet) {
        match self {
            SelectionOutcome::Found(selection) => (selection.descriptors, selection.folders),
            _ => (Vec::new(), LanguageFolderSet::new()),
        }
    }
}

pub struct SubtitleTrackSelector<'a> {
    languages: &'a RequestedLanguages,
}

impl<'a> SubtitleTrackSelector<'a> {
    pub fn new(languages: &'a RequestedLanguages) -> Self {
        Self { languages }
    }

    pub async fn select(
        &self,
        media_info: Option<&MediaInfo>,
        folder_path: &Path,
        filename: &str,
    ) -> Result<SelectionOutcome, SubtitleError> {
        let Some(media_info) = media_info else {
            return Ok(SelectionOutcome::NotYetReleased);
        };

        if media_info.subtitles.is_empty() {
            if media_info.video.hardsubs {
                error!("Sorry, there's no embedded subtitles in this video!");
                return Ok(SelectionOutcome::NoneAvailable(NoneReason::HardsubsOnly));
            }
            error!(
                "Please check your subscription plan, and make sure you are able to watch it online!"
            );
            return Ok(SelectionOutcome::NoneAvailable(NoneReason::AccessRestricted));
        }

        let mut selection = Selection::default();
        for track in media_info.subtitles.iter().filter(|t| t.is_complete()) {
            let language = normalize_language_code(&track.language_code);
            let Some(source_url) = track.source_url.as_deref() else {
                warn!(%language, "Complete subtitle track has no source url");
                continue;
            };
            selection.available_languages.insert(language.clone());

            if !self.languages.contains(&language) {
                continue;
            }

            let destination = selection.folders.destination_for(folder_path, &language);
            selection.folders.insert(destination.clone());
            tokio::fs::create_dir_all(&destination).await?;

            debug!(%language, folder = %destination.display(), "Selected subtitle track");
            selection.descriptors.push(SubtitleDescriptor {
                target_filename: language_filename(filename, &language),
                destination_folder: destination,
                source_url: source_url.to_string(),
            });
        }

        selection.missing_languages =
            report_missing_languages(&selection.available_languages, self.languages);

        if selection.descriptors.is_empty() {
            return Ok(SelectionOutcome::NoneAvailable(
                NoneReason::LanguagesUnavailable {
                    missing: selection.missing_languages,
                },
            ));
        }
        Ok(SelectionOutcome::Found(selection))
    }
}
