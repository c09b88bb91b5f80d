use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

use super::client::ReleaseApi;
use super::enumerate::{AssetCandidate, enumerate_assets};
use super::error::{Error, Result};
use super::upload::AssetUploader;

/// Default number of concurrent upload workers
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

const CHANNEL_CAPACITY: usize = 100;

type IndexedResult = (usize, Result<String>);

/// Uploads every asset in a directory to a release
///
/// A fixed pool of workers pulls index-tagged assets from a work channel.
/// All workers are joined before [`UploadOrchestrator::run`] returns, so a
/// failed upload never leaves others running in the background.
pub struct UploadOrchestrator {
    api: Arc<dyn ReleaseApi>,
    max_concurrent: usize,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn ReleaseApi>, max_concurrent: usize) -> Self {
        Self {
            api,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Upload all assets in `asset_dir` and return their download URLs
    ///
    /// URLs are in enumeration order, independent of completion order.
    ///
    /// # Errors
    ///
    /// Fails without uploading anything if the directory cannot be listed.
    /// If any upload fails, every other upload is still allowed to finish
    /// and the error of the first failed asset (in enumeration order) is
    /// returned; no URLs are returned in that case.
    pub async fn run(&self, upload_url: &str, asset_dir: &Path) -> Result<Vec<String>> {
        let candidates = enumerate_assets(asset_dir).await?;

        if candidates.is_empty() {
            info!("No assets found in {}", asset_dir.display());
            return Ok(Vec::new());
        }

        let uploader = AssetUploader::new(Arc::clone(&self.api), upload_url);
        let slots = self.upload_all(&uploader, candidates).await?;

        let total = slots.len();
        let failed = failed_uploads(&slots);
        if failed > 0 {
            error!("{} of {} asset upload(s) failed", failed, total);
        }

        let mut urls = Vec::with_capacity(total);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(url)) => urls.push(url),
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(Error::Worker(format!(
                        "no result reported for asset #{}",
                        index
                    )));
                }
            }
        }

        info!("Uploaded {} asset(s)", urls.len());
        Ok(urls)
    }

    async fn upload_all(
        &self,
        uploader: &AssetUploader,
        candidates: Vec<AssetCandidate>,
    ) -> Result<Vec<Option<Result<String>>>> {
        let total = candidates.len();
        let workers_count = self.max_concurrent.min(total);
        info!(
            "Uploading {} asset(s) to {} with {} workers",
            total,
            uploader.upload_url(),
            workers_count
        );

        let (work_tx, work_rx) = mpsc::channel::<(usize, AssetCandidate)>(CHANNEL_CAPACITY);
        let (result_tx, mut result_rx) = mpsc::channel::<IndexedResult>(CHANNEL_CAPACITY);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let mut workers = Vec::with_capacity(workers_count);
        for _ in 0..workers_count {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let uploader = uploader.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    let next = {
                        let mut rx_guard = work_rx.lock().await;
                        rx_guard.recv().await
                    };

                    let Some((index, candidate)) = next else {
                        break;
                    };

                    let result = uploader.upload(&candidate).await;
                    if let Err(e) = &result {
                        error!("Upload failed for {}: {}", candidate.name, e);
                    }

                    if result_tx.send((index, result)).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let collector = tokio::spawn(async move {
            let mut slots: Vec<Option<Result<String>>> = (0..total).map(|_| None).collect();
            while let Some((index, result)) = result_rx.recv().await {
                slots[index] = Some(result);
            }
            slots
        });

        let mut send_failed = false;
        for item in candidates.into_iter().enumerate() {
            if work_tx.send(item).await.is_err() {
                send_failed = true;
                break;
            }
        }
        drop(work_tx);

        let mut worker_error = None;
        for joined in futures::future::join_all(workers).await {
            if let Err(e) = joined {
                worker_error.get_or_insert_with(|| Error::Worker(e.to_string()));
            }
        }

        let slots = collector
            .await
            .map_err(|e| Error::Worker(e.to_string()))?;

        if let Some(e) = worker_error {
            return Err(e);
        }
        if send_failed {
            return Err(Error::Worker("all upload workers exited early".to_string()));
        }

        Ok(slots)
    }
}

/// Number of uploads that reported an error; missing worker results are not counted
fn failed_uploads(slots: &[Option<Result<String>>]) -> usize {
    slots.iter().filter(|r| matches!(r, Some(Err(_)))).count()
}
