#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]

//! Vendor root certificate stores as local PEM files and trust pools
//!
//! Apple, Chromium, Microsoft and Mozilla NSS each publish the certificate
//! authorities they trust, in four unrelated formats. This crate downloads
//! each one, normalizes it to a single PEM file under a root directory, and
//! parses that file into a [`TrustPool`].
//!
//! ```no_run
//! use rootstore::{RootStore, StoreConfig, Vendor};
//!
//! # async fn run() -> rootstore::Result<()> {
//! let store = RootStore::new(StoreConfig::new("roots")?)?;
//! let chromium = store.update(Vendor::Chromium).await?;
//! println!("{} Chromium roots", chromium.len());
//!
//! // Later, without network access:
//! let cached = store.get(Vendor::Chromium).await?;
//! let roots = cached.root_cert_store()?;
//! # let _ = roots;
//! # Ok(())
//! # }
//! ```
//!
//! A store file that exists and is non-empty is never downloaded again;
//! delete it to force a refresh.

pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http_client;
pub mod pem;
pub mod pool;
pub mod store;
pub mod vendor;

pub use config::{MicrosoftListing, RetryPolicy, StoreConfig, VendorEndpoints};
pub use downloader::{BatchOutcome, Downloader};
pub use error::{Result, RootStoreError};
pub use http_client::{Fetcher, HttpFetcher};
pub use pem::BodyFormat;
pub use pool::{TrustAnchor, TrustPool};
pub use store::RootStore;
pub use vendor::{AdapterContext, Vendor, VendorAdapter};
