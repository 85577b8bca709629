//! Throttled batch downloads with bounded retry passes
//!
//! A batch is a list of identifiers, each mapped to one certificate URL.
//! Every pass requests the identifiers still outstanding; retryable failures
//! are carried into the next pass until none remain or the pass budget in
//! [`RetryPolicy`] is spent.

use futures::stream::{self, TryStreamExt};
use tokio::sync::Mutex;

use crate::config::RetryPolicy;
use crate::error::{Result, RootStoreError};
use crate::http_client::Fetcher;
use crate::pem::{count_certificates, BodyFormat};

/// Result of a batch download
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Concatenated PEM text of every successful download
    pub pem: String,
    /// Identifiers downloaded, in completion order, each once
    pub fetched: Vec<String>,
    /// Identifiers that still failed in the last pass
    pub failed: Vec<String>,
    /// Passes that were run
    pub passes: usize,
}

impl BatchOutcome {
    /// Whether every identifier was downloaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Accumulated PEM, or `RetriesExhausted` when identifiers are left over
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::RetriesExhausted` if any identifier failed.
    pub fn into_pem(self) -> Result<String> {
        if self.failed.is_empty() {
            Ok(self.pem)
        } else {
            Err(RootStoreError::RetriesExhausted {
                passes: self.passes,
                failed: self.failed,
            })
        }
    }
}

/// Batch downloader over a [`Fetcher`]
pub struct Downloader<'a> {
    fetcher: &'a dyn Fetcher,
    policy: RetryPolicy,
}

impl<'a> Downloader<'a> {
    /// Create a downloader with the given policy.
    ///
    /// Pass and concurrency bounds below one are raised to one.
    #[must_use]
    pub fn new(fetcher: &'a dyn Fetcher, policy: RetryPolicy) -> Self {
        let policy = RetryPolicy {
            max_passes: policy.max_passes.max(1),
            concurrency: policy.concurrency.max(1),
            ..policy
        };
        Self { fetcher, policy }
    }

    /// Policy in effect after bounds are applied
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Download every identifier, normalizing each body as `format`.
    ///
    /// `url_for` maps an identifier to its download URL. Empty identifiers
    /// are skipped. A DER body that is not a certificate counts as a failed
    /// download and is retried; a PEM body without certificates is kept.
    ///
    /// # Errors
    ///
    /// Returns an error only for non-retryable fetch failures. Exhausted
    /// retries are reported through [`BatchOutcome::failed`].
    pub async fn fetch_batch<F>(
        &self,
        ids: &[String],
        format: BodyFormat,
        url_for: F,
    ) -> Result<BatchOutcome>
    where
        F: Fn(&str) -> String + Sync,
    {
        let accumulator = Mutex::new(String::new());
        let fetched = Mutex::new(Vec::new());
        let mut pending: Vec<String> = ids
            .iter()
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .collect();
        let mut passes = 0;

        while !pending.is_empty() && passes < self.policy.max_passes {
            passes += 1;
            tracing::info!(
                "Download pass {}/{}: {} identifiers",
                passes,
                self.policy.max_passes,
                pending.len()
            );

            let failed = Mutex::new(Vec::new());
            let (accumulator, fetched, failed_ref, url_for) =
                (&accumulator, &fetched, &failed, &url_for);

            stream::iter(pending.iter().map(Ok::<_, RootStoreError>))
                .try_for_each_concurrent(self.policy.concurrency, |id| async move {
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }

                    let url = url_for(id.as_str());
                    let body = match self.fetcher.fetch(&url).await {
                        Ok(body) => body,
                        Err(e) if e.is_retryable() => {
                            tracing::warn!("Download of {} failed, will retry: {}", id, e);
                            failed_ref.lock().await.push(id.clone());
                            return Ok(());
                        }
                        Err(e) => return Err(e),
                    };

                    let pem = match format.normalize(&body) {
                        Ok(pem) => pem,
                        Err(e) => {
                            tracing::warn!("Response for {} rejected, will retry: {}", id, e);
                            failed_ref.lock().await.push(id.clone());
                            return Ok(());
                        }
                    };
                    if count_certificates(pem.as_bytes()) == 0 {
                        tracing::warn!("Response for {} contains no certificates", id);
                    }

                    accumulator.lock().await.push_str(&pem);
                    fetched.lock().await.push(id.clone());
                    Ok(())
                })
                .await?;

            pending = failed.into_inner();
            if !pending.is_empty() {
                tracing::info!("{} identifiers failed in pass {}", pending.len(), passes);
            }
        }

        Ok(BatchOutcome {
            pem: accumulator.into_inner(),
            fetched: fetched.into_inner(),
            failed: pending,
            passes,
        })
    }
}
