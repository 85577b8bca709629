//! Root store facade
//!
//! [`RootStore`] ties the pieces together for each vendor: cache check,
//! adapter download and normalization, store file write, pool build.

use std::sync::Arc;

use crate::cache::{store_is_populated, write_store};
use crate::config::StoreConfig;
use crate::error::{Result, RootStoreError};
use crate::http_client::{Fetcher, HttpFetcher};
use crate::pem::count_certificates;
use crate::pool::TrustPool;
use crate::vendor::{adapter_for, AdapterContext, Vendor, VendorAdapter};

/// Per-vendor update and lookup over one root directory
#[derive(Clone)]
pub struct RootStore {
    config: StoreConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for RootStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RootStore {
    /// Create a root store that downloads over HTTP
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Ok(Self::with_fetcher(config, Arc::new(HttpFetcher::new()?)))
    }

    /// Create a root store with a custom fetcher
    #[must_use]
    pub fn with_fetcher(config: StoreConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Download `vendor`'s store unless already present, then return its pool
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the download or normalization fails
    /// - normalization yields no certificates (`EmptyStore`, nothing is written)
    /// - the store file cannot be written or parsed
    pub async fn update(&self, vendor: Vendor) -> Result<TrustPool> {
        let adapter = adapter_for(vendor, &self.config);
        self.update_with(adapter.as_ref()).await
    }

    /// [`update`](Self::update) with an explicit adapter
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub async fn update_with(&self, adapter: &dyn VendorAdapter) -> Result<TrustPool> {
        let vendor = adapter.vendor();
        let store_path = self.config.store_path(vendor);
        tracing::info!("Attempting to update {} root store", vendor);

        if !store_is_populated(&store_path).await {
            let ctx = AdapterContext {
                config: &self.config,
                fetcher: self.fetcher.as_ref(),
            };
            let pem = adapter.fetch_and_normalize(&ctx).await?;

            let certificates = count_certificates(&pem);
            if certificates == 0 {
                return Err(RootStoreError::EmptyStore { vendor });
            }

            write_store(&store_path, &pem).await?;
            tracing::info!(
                "{} root store written to {} ({} certificates)",
                vendor,
                store_path.display(),
                certificates
            );
        }

        adapter.read_existing(&self.config).await
    }

    /// Parse `vendor`'s existing store without touching the network
    ///
    /// # Errors
    ///
    /// Returns an IO error if the store file is missing or empty, or a parse
    /// error if its content is not a valid set of certificates.
    pub async fn get(&self, vendor: Vendor) -> Result<TrustPool> {
        TrustPool::from_pem_file(&self.config.store_path(vendor)).await
    }

    /// Update every vendor in [`Vendor::ALL`] order, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first vendor update error.
    pub async fn update_all(&self) -> Result<Vec<(Vendor, TrustPool)>> {
        let mut pools = Vec::with_capacity(Vendor::ALL.len());
        for vendor in Vendor::ALL {
            pools.push((vendor, self.update(vendor).await?));
        }
        Ok(pools)
    }

    /// Update the Apple store
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn update_apple(&self) -> Result<TrustPool> {
        self.update(Vendor::Apple).await
    }

    /// Read the Apple store
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_apple(&self) -> Result<TrustPool> {
        self.get(Vendor::Apple).await
    }

    /// Update the Chromium store
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn update_chromium(&self) -> Result<TrustPool> {
        self.update(Vendor::Chromium).await
    }

    /// Read the Chromium store
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_chromium(&self) -> Result<TrustPool> {
        self.get(Vendor::Chromium).await
    }

    /// Update the Microsoft store
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn update_microsoft(&self) -> Result<TrustPool> {
        self.update(Vendor::Microsoft).await
    }

    /// Read the Microsoft store
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_microsoft(&self) -> Result<TrustPool> {
        self.get(Vendor::Microsoft).await
    }

    /// Update the NSS store
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn update_nss(&self) -> Result<TrustPool> {
        self.update(Vendor::Nss).await
    }

    /// Read the NSS store
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_nss(&self) -> Result<TrustPool> {
        self.get(Vendor::Nss).await
    }
}
