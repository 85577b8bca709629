//! Error types for root store acquisition and pool building

use std::fmt;
use thiserror::Error;

use crate::vendor::Vendor;

/// Result type alias for root store operations
pub type Result<T> = std::result::Result<T, RootStoreError>;

/// Main error type for all root store operations
#[derive(Error, Debug)]
pub enum RootStoreError {
    /// Root directory or other configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server answered with a non-success status
    #[error("Bad status {status} from {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Request never produced a response (DNS, connect, timeout, body read)
    #[error("Transport error for {url}: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client error
        message: String,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client initialization failed: {context}")]
    HttpClientInit {
        /// Client builder error
        source: Box<dyn std::error::Error + Send + Sync>,
        /// What the client was being built for
        context: &'static str,
    },

    /// Vendor artifact did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source archive could not be decompressed or unpacked
    #[error("Archive error: {0}")]
    Archive(String),

    /// CSV report could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A DER entry was rejected by the X.509 parser
    #[error("Certificate parsing failed: {0}")]
    CertificateParse(String),

    /// A normalized store file held no decodable certificates
    #[error("error decoding pem to tls: no certificates in {path}")]
    NoCertificates {
        /// Store file that was read
        path: String,
    },

    /// Normalization produced no certificates, nothing was written
    #[error("{vendor} root store normalized to zero certificates")]
    EmptyStore {
        /// Vendor whose artifact came back empty
        vendor: Vendor,
    },

    /// Some identifiers still failed after the last allowed pass
    #[error("Giving up after {passes} passes, {} identifiers still failing", .failed.len())]
    RetriesExhausted {
        /// Passes that were run
        passes: usize,
        /// Identifiers that never succeeded
        failed: Vec<String>,
    },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl RootStoreError {
    /// Create a `Config` error with a formatted message
    #[must_use]
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    /// Create a `Parse` error with a formatted message
    #[must_use]
    pub fn parse(msg: impl fmt::Display) -> Self {
        Self::Parse(msg.to_string())
    }

    /// Create an `Archive` error with a formatted message
    #[must_use]
    pub fn archive(msg: impl fmt::Display) -> Self {
        Self::Archive(msg.to_string())
    }

    /// Create a `CertificateParse` error with a formatted message
    #[must_use]
    pub fn certificate(msg: impl fmt::Display) -> Self {
        Self::CertificateParse(msg.to_string())
    }

    /// Whether a batch download should record this error and try again later
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Transport { .. })
    }
}

impl From<tokio::task::JoinError> for RootStoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
