use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::providers::blob_store::BlobStore;
use crate::types::internal::context::RequestContext;

const CLEANUP_OPERATION: &str = "blob_cleanup";

enum CleanupJob {
    Destroy(Vec<String>),
    Flush(oneshot::Sender<()>),
}

/// Background destruction of blobs that are no longer referenced
///
/// Jobs run on a single worker task in submission order. Each blob gets up to
/// `max_attempts` tries; a blob that still fails is logged and dropped.
#[derive(Clone)]
pub struct CleanupQueue {
    sender: mpsc::UnboundedSender<CleanupJob>,
    blob_store: Arc<dyn BlobStore>,
}

impl CleanupQueue {
    /// Spawn the worker on the current tokio runtime
    pub fn start(blob_store: Arc<dyn BlobStore>, max_attempts: u32, retry_delay: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = CleanupWorker {
            blob_store: blob_store.clone(),
            max_attempts: max_attempts.max(1),
            retry_delay,
        };
        tokio::spawn(worker.run(receiver));
        Self { sender, blob_store }
    }

    /// Queue blobs by the URLs stored on entities
    pub fn enqueue_urls(&self, urls: &[String]) {
        let public_ids: Vec<String> = urls
            .iter()
            .filter_map(|url| {
                let public_id = self.blob_store.public_id_from_url(url);
                if public_id.is_none() {
                    tracing::debug!(url = %url, "Skipping cleanup of foreign media URL");
                }
                public_id
            })
            .collect();
        self.enqueue_public_ids(public_ids);
    }

    pub fn enqueue_public_ids(&self, public_ids: Vec<String>) {
        if public_ids.is_empty() {
            return;
        }
        if self.sender.send(CleanupJob::Destroy(public_ids)).is_err() {
            tracing::warn!("Cleanup worker has stopped; media left behind");
        }
    }

    /// Wait until every job queued before this call has been processed
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(CleanupJob::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

struct CleanupWorker {
    blob_store: Arc<dyn BlobStore>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CleanupWorker {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<CleanupJob>) {
        while let Some(job) = receiver.recv().await {
            match job {
                CleanupJob::Destroy(public_ids) => {
                    let ctx = job_context();
                    for public_id in public_ids {
                        self.destroy_with_retry(&ctx, &public_id).await;
                    }
                }
                CleanupJob::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        tracing::debug!("Cleanup worker stopped");
    }

    async fn destroy_with_retry(&self, ctx: &RequestContext, public_id: &str) {
        for attempt in 1..=self.max_attempts {
            match self.blob_store.destroy(public_id).await {
                Ok(()) => {
                    tracing::debug!(actor = %ctx.actor_id, request_id = %ctx.request_id, public_id = %public_id, attempt, "Destroyed blob");
                    return;
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::debug!(
                        request_id = %ctx.request_id,
                        public_id = %public_id,
                        attempt,
                        error = %e,
                        "Blob destroy failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::warn!(
                        actor = %ctx.actor_id,
                        request_id = %ctx.request_id,
                        public_id = %public_id,
                        attempts = self.max_attempts,
                        error = %e,
                        "Giving up on blob cleanup"
                    );
                }
            }
        }
    }
}

/// Context attributed to one batch of background deletions
fn job_context() -> RequestContext {
    RequestContext::for_system(CLEANUP_OPERATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::blob_store::MemoryBlobStore;
    use crate::types::internal::context::RequestSource;

    #[test]
    fn test_jobs_run_as_system_actor() {
        let ctx = job_context();

        assert_eq!(ctx.source, RequestSource::System);
        assert_eq!(ctx.actor_id, "system:blob_cleanup");
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_enqueued_urls_are_destroyed() {
        let store = Arc::new(MemoryBlobStore::new());
        let blob = store.upload(vec![], "reviews", Some("image/png")).await.unwrap();
        let queue = CleanupQueue::start(store.clone(), 3, Duration::from_millis(1));

        queue.enqueue_urls(&[blob.url.clone(), "https://elsewhere.test/x.png".to_string()]);
        queue.flush().await;

        assert!(store.stored().is_empty());
        assert_eq!(store.destroyed(), vec![blob.public_id]);
    }

    #[tokio::test]
    async fn test_persistent_failures_are_dropped() {
        let store = Arc::new(MemoryBlobStore::new());
        let blob = store.upload(vec![], "reviews", None).await.unwrap();
        store.set_fail_destroys(true);
        let queue = CleanupQueue::start(store.clone(), 2, Duration::from_millis(1));

        queue.enqueue_public_ids(vec![blob.public_id.clone()]);
        queue.flush().await;

        assert_eq!(store.stored(), vec![blob.public_id]);
        assert!(store.destroyed().is_empty());
    }
}
