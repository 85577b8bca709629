//! Store configuration
//!
//! All on-disk locations are derived from a single root directory held in
//! [`StoreConfig`]. Nothing here is global; two configs with different roots
//! can be used side by side.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, RootStoreError};
use crate::vendor::Vendor;

/// Default root directory, relative to the working directory
pub const DEFAULT_ROOT_DIR: &str = "roots";

/// Apple security_certificates release used by default
pub const APPLE_SECURITY_VERSION: &str = "55246.140.2";

const APPLE_WORK_DIR: &str = "apple";
const NSS_CSV_FILE: &str = "IncludedCACertificateWithPEMReport.csv";

/// Retry and throttling policy for batch downloads
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of passes over the identifier list, first pass included
    pub max_passes: usize,
    /// Fixed pause before every request
    pub delay: Duration,
    /// Requests allowed in flight at once
    pub concurrency: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_passes: 10,
            delay: Duration::from_secs(2),
            concurrency: 1,
        }
    }
}

impl RetryPolicy {
    /// Set the maximum number of passes (at least one)
    #[must_use]
    pub fn with_max_passes(self, max_passes: usize) -> Self {
        Self {
            max_passes: max_passes.max(1),
            ..self
        }
    }

    /// Set the fixed inter-request delay
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    /// Set the number of concurrent requests (at least one)
    #[must_use]
    pub fn with_concurrency(self, concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            ..self
        }
    }
}

/// Which field of the Microsoft report identifies a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrosoftListing {
    /// Each row links to a crt.sh page serving PEM text
    CrtShLinks,
    /// Each row carries a SHA-1 fingerprint appended to a DER download endpoint
    Sha1Fingerprints,
}

/// Network endpoints for every vendor
#[derive(Debug, Clone)]
pub struct VendorEndpoints {
    /// Apple security_certificates release tag
    pub apple_version: String,
    /// Apple source archive URL; derived from `apple_version` when `None`
    pub apple_archive_url: Option<String>,
    /// Chromium root store, served as base64 text
    pub chromium_url: String,
    /// Microsoft CCADB report page
    pub microsoft_report_url: String,
    /// Per-certificate download prefix for fingerprint listings
    pub microsoft_download_url: String,
    /// How identifiers are read from the Microsoft report
    pub microsoft_listing: MicrosoftListing,
    /// Mozilla CCADB PEM CSV report
    pub nss_csv_url: String,
    /// Zero-based index of the PEM column in the NSS CSV
    pub nss_pem_column: usize,
}

impl Default for VendorEndpoints {
    fn default() -> Self {
        Self {
            apple_version: APPLE_SECURITY_VERSION.to_string(),
            apple_archive_url: None,
            chromium_url: "https://chromium.googlesource.com/chromium/src/+/main/net/data/ssl/chrome_root_store/root_store.certs?format=TEXT".to_string(),
            microsoft_report_url: "https://ccadb-public.secure.force.com/microsoft/IncludedCACertificateReportForMSFT".to_string(),
            microsoft_download_url: "http://ctldl.windowsupdate.com/msdownload/update/v3/static/trustedr/en/".to_string(),
            microsoft_listing: MicrosoftListing::Sha1Fingerprints,
            nss_csv_url: "https://ccadb-public.secure.force.com/mozilla/IncludedCACertificateReportPEMCSV".to_string(),
            nss_pem_column: 32,
        }
    }
}

impl VendorEndpoints {
    /// Apple archive URL for the configured release
    #[must_use]
    pub fn apple_archive_url(&self) -> String {
        match &self.apple_archive_url {
            Some(url) => url.clone(),
            None => format!(
                "https://github.com/apple-oss-distributions/security_certificates/archive/refs/tags/security_certificates-{}.tar.gz",
                self.apple_version
            ),
        }
    }
}

/// Root directory plus per-vendor settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    root: PathBuf,
    /// Vendor endpoints
    pub endpoints: VendorEndpoints,
    /// Policy for the Microsoft per-certificate downloads
    pub retry: RetryPolicy,
}

impl StoreConfig {
    /// Create a configuration rooted at an existing directory
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::Config` if `root` does not exist, cannot be
    /// inspected, or is not a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let metadata = std::fs::metadata(root).map_err(|e| {
            RootStoreError::config(format!("Root directory {} is not accessible: {e}", root.display()))
        })?;
        if !metadata.is_dir() {
            return Err(RootStoreError::config(format!(
                "Root path {} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            root: root.to_path_buf(),
            endpoints: VendorEndpoints::default(),
            retry: RetryPolicy::default(),
        })
    }

    /// Path used when no root is given explicitly
    #[must_use]
    pub fn default_root() -> PathBuf {
        PathBuf::from(DEFAULT_ROOT_DIR)
    }

    /// Replace the vendor endpoints
    #[must_use]
    pub fn with_endpoints(self, endpoints: VendorEndpoints) -> Self {
        Self { endpoints, ..self }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    /// Root directory all paths hang off
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalized PEM store for `vendor`
    #[must_use]
    pub fn store_path(&self, vendor: Vendor) -> PathBuf {
        self.root.join(vendor.file_name())
    }

    /// Scratch directory for the Apple archive
    #[must_use]
    pub fn apple_work_dir(&self) -> PathBuf {
        self.root.join(APPLE_WORK_DIR)
    }

    /// Scratch CSV for the NSS report
    #[must_use]
    pub fn nss_csv_path(&self) -> PathBuf {
        self.root.join(NSS_CSV_FILE)
    }
}
