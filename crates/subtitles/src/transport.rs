use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::SubtitleError;
use crate::subtitle::SubtitleDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub failed: Vec<String>,
}

impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetches subtitle files to disk.
///
/// Implementations return only after every descriptor has either been
/// written or failed.
#[async_trait]
pub trait FileTransport: Send + Sync {
    async fn download(
        &self,
        descriptors: &[SubtitleDescriptor],
    ) -> Result<DownloadReport, SubtitleError>;
}

pub struct HttpTransport {
    client: Client,
    concurrency: usize,
}

impl HttpTransport {
    pub fn new(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_one(&self, descriptor: &SubtitleDescriptor) -> Result<(), SubtitleError> {
        let response = self.client.get(&descriptor.source_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubtitleError::Status { status, body });
        }
        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(&descriptor.destination_folder).await?;
        tokio::fs::write(descriptor.target_path(), &bytes).await?;
        debug!(
            file = %descriptor.target_filename,
            size = bytes.len(),
            "Subtitle saved"
        );
        Ok(())
    }

    fn download_one<'a>(
        &'a self,
        descriptor: &'a SubtitleDescriptor,
    ) -> impl Future<Output = (&'a SubtitleDescriptor, Result<(), SubtitleError>)> + Send + 'a
    {
        async move { (descriptor, self.fetch_one(descriptor).await) }
    }
}

#[async_trait]
impl FileTransport for HttpTransport {
    async fn download(
        &self,
        descriptors: &[SubtitleDescriptor],
    ) -> Result<DownloadReport, SubtitleError> {
        let downloads: Vec<_> = descriptors
            .iter()
            .map(|descriptor| self.download_one(descriptor))
            .collect();
        let results: Vec<_> = stream::iter(downloads)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = DownloadReport::default();
        for (descriptor, result) in results {
            match result {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    error!(
                        file = %descriptor.target_filename,
                        url = %descriptor.source_url,
                        error = %e,
                        "Failed to download subtitle"
                    );
                    report.failed.push(descriptor.target_filename.clone());
                }
            }
        }

        info!(
            downloaded = report.downloaded,
            failed = report.failed.len(),
            "Subtitle download finished"
        );
        Ok(report)
    }
}
