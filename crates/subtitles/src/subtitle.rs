use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One subtitle file to fetch: where it comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleDescriptor {
    pub target_filename: String,
    pub destination_folder: PathBuf,
    pub source_url: String,
}

impl SubtitleDescriptor {
    pub fn target_path(&self) -> PathBuf {
        self.destination_folder.join(&self.target_filename)
    }
}

/// Distinct destination folders, iterated in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFolderSet {
    folders: BTreeSet<PathBuf>,
}

impl LanguageFolderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, folder: PathBuf) -> bool {
        self.folders.insert(folder)
    }

    pub fn extend(&mut self, other: LanguageFolderSet) {
        self.folders.extend(other.folders);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.folders.iter()
    }

    /// Destination for the next track in `language`.
    ///
    /// Only once more than one distinct folder has been recorded do tracks
    /// move into a per-language subfolder of `root`. The check runs against
    /// the set as it is right now, so the result depends on track order.
    pub fn destination_for(&self, root: &Path, language: &str) -> PathBuf {
        if self.folders.len() > 1 {
            root.join(language)
        } else {
            root.to_path_buf()
        }
    }
}

impl FromIterator<PathBuf> for LanguageFolderSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            folders: iter.into_iter().collect(),
        }
    }
}

/// `Show.X.2020.WEB-DL.Viki.vtt` -> `Show.X.2020.WEB-DL.Viki.en.vtt`
pub fn language_filename(filename: &str, language: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{language}.{ext}"),
        None => format!("{filename}.{language}"),
    }
}
