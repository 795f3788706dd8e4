use std::path::Path;

use tracing::{debug, warn};

use crate::convert::{SubtitleConverter, SubtitleFormat};
use crate::error::SubtitleError;
use crate::subtitle::{LanguageFolderSet, SubtitleDescriptor};
use crate::transport::{DownloadReport, FileTransport};

/// Downloads a unit's subtitles, then converts its folders.
pub struct DownloadOrchestrator<'a> {
    transport: &'a dyn FileTransport,
    converter: &'a dyn SubtitleConverter,
    format: SubtitleFormat,
}

impl<'a> DownloadOrchestrator<'a> {
    pub fn new(
        transport: &'a dyn FileTransport,
        converter: &'a dyn SubtitleConverter,
        format: SubtitleFormat,
    ) -> Self {
        Self {
            transport,
            converter,
            format,
        }
    }

    /// Returns `None` when there was nothing to download.
    ///
    /// Conversion starts only after the transport has finished every
    /// descriptor. Language folders are converted in sorted order, then the
    /// root folder once more.
    pub async fn run(
        &self,
        descriptors: Vec<SubtitleDescriptor>,
        language_folders: &LanguageFolderSet,
        root_folder: &Path,
    ) -> Result<Option<DownloadReport>, SubtitleError> {
        if descriptors.is_empty() {
            debug!(folder = %root_folder.display(), "No subtitles to download");
            return Ok(None);
        }

        let report = self.transport.download(&descriptors).await?;
        if !report.is_complete() {
            warn!(failed = ?report.failed, "Some subtitles could not be downloaded");
        }

        for folder in language_folders.iter() {
            self.converter.convert(folder, self.format).await?;
        }
        self.converter.convert(root_folder, self.format).await?;

        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal {
        events: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FileTransport for Journal {
        async fn download(
            &self,
            descriptors: &[SubtitleDescriptor],
        ) -> Result<DownloadReport, SubtitleError> {
            let mut events = self.events.lock().unwrap();
            for d in descriptors {
                events.push(format!("download {}", d.target_filename));
            }
            Ok(DownloadReport {
                downloaded: descriptors.len(),
                failed: Vec::new(),
            })
        }
    }

    #[async_trait]
    impl SubtitleConverter for Journal {
        async fn convert(
            &self,
            folder: &Path,
            _format: SubtitleFormat,
        ) -> Result<(), SubtitleError> {
            self.events
                .lock()
                .unwrap()
                .push(format!("convert {}", folder.display()));
            Ok(())
        }
    }

    fn descriptor(name: &str, folder: &str) -> SubtitleDescriptor {
        SubtitleDescriptor {
            target_filename: name.to_string(),
            destination_folder: PathBuf::from(folder),
            source_url: format!("https://sub.example/{name}"),
        }
    }

    #[tokio::test]
    async fn test_empty_descriptors_are_a_noop() {
        let journal = Journal::default();
        let orchestrator = DownloadOrchestrator::new(&journal, &journal, SubtitleFormat::Srt);

        let report = orchestrator
            .run(Vec::new(), &LanguageFolderSet::new(), Path::new("/root"))
            .await
            .unwrap();
        assert!(report.is_none());
        assert!(journal.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_downloads_before_sorted_conversions() {
        let journal = Journal::default();
        let orchestrator = DownloadOrchestrator::new(&journal, &journal, SubtitleFormat::Srt);
        let folders: LanguageFolderSet = [PathBuf::from("/root/ko"), PathBuf::from("/root/en")]
            .into_iter()
            .collect();

        orchestrator
            .run(
                vec![descriptor("a.en.vtt", "/root/en"), descriptor("a.ko.vtt", "/root/ko")],
                &folders,
                Path::new("/root"),
            )
            .await
            .unwrap();

        assert_eq!(
            *journal.events.lock().unwrap(),
            vec![
                "download a.en.vtt",
                "download a.ko.vtt",
                "convert /root/en",
                "convert /root/ko",
                "convert /root",
            ]
        );
    }
}
