//! Trust pool construction from normalized PEM stores

use std::path::Path;

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use sha2::{Digest, Sha256};
use x509_parser::parse_x509_certificate;

use crate::error::{Result, RootStoreError};
use crate::pem::extract_certificates;

/// A parsed root certificate
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    der: CertificateDer<'static>,
    /// Subject distinguished name
    pub subject: String,
    /// Serial number as lowercase hex
    pub serial: String,
    /// SHA-256 over the DER encoding, uppercase hex
    pub sha256_fingerprint: String,
}

impl TrustAnchor {
    /// Parse a DER certificate
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::CertificateParse` if the bytes are not a
    /// well-formed X.509 certificate or carry trailing data.
    pub fn from_der(der: CertificateDer<'static>) -> Result<Self> {
        let (subject, serial) = {
            let (rest, cert) = parse_x509_certificate(der.as_ref())
                .map_err(|e| RootStoreError::certificate(format!("X.509 parsing failed: {e}")))?;
            if !rest.is_empty() {
                return Err(RootStoreError::certificate(format!(
                    "{} trailing bytes after certificate",
                    rest.len()
                )));
            }
            (cert.subject().to_string(), hex::encode(cert.raw_serial()))
        };

        let sha256_fingerprint = hex::encode_upper(Sha256::digest(der.as_ref()));

        Ok(Self {
            der,
            subject,
            serial,
            sha256_fingerprint,
        })
    }

    /// DER encoding
    #[must_use]
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }
}

/// In-memory set of root certificates from one vendor store
#[derive(Debug, Clone, Default)]
pub struct TrustPool {
    anchors: Vec<TrustAnchor>,
}

impl TrustPool {
    /// Empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a normalized store file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file is missing or unreadable (`Io`)
    /// - the file is empty (`Io` with `UnexpectedEof`)
    /// - no certificate blocks decode (`NoCertificates`)
    /// - any certificate fails to parse (`CertificateParse`); no partial pool is returned
    pub async fn from_pem_file(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        if data.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("store file {} is empty", path.display()),
            )
            .into());
        }

        let pool = Self::from_pem(&data)?;
        if pool.is_empty() {
            return Err(RootStoreError::NoCertificates {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loaded {} certificates from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Parse every certificate in a PEM blob
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::CertificateParse` on the first certificate
    /// that fails to parse.
    pub fn from_pem(data: &[u8]) -> Result<Self> {
        let mut pool = Self::new();
        for der in extract_certificates(data) {
            pool.add(TrustAnchor::from_der(der)?);
        }
        Ok(pool)
    }

    /// Append an anchor
    pub fn add(&mut self, anchor: TrustAnchor) {
        self.anchors.push(anchor);
    }

    /// Number of anchors
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the pool holds no anchors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors in store order
    pub fn iter(&self) -> impl Iterator<Item = &TrustAnchor> {
        self.anchors.iter()
    }

    /// Whether an anchor with this SHA-256 fingerprint is present (hex, any case)
    #[must_use]
    pub fn contains_fingerprint(&self, fingerprint: &str) -> bool {
        self.anchors
            .iter()
            .any(|a| a.sha256_fingerprint.eq_ignore_ascii_case(fingerprint))
    }

    /// Build a `rustls` root store for chain verification
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::CertificateParse` if `rustls` rejects an anchor.
    pub fn root_cert_store(&self) -> Result<RootCertStore> {
        let mut store = RootCertStore::empty();
        for anchor in &self.anchors {
            store.add(anchor.der.clone()).map_err(|e| {
                RootStoreError::certificate(format!(
                    "rustls rejected {}: {e}",
                    anchor.subject
                ))
            })?;
        }
        Ok(store)
    }
}

impl<'a> IntoIterator for &'a TrustPool {
    type Item = &'a TrustAnchor;
    type IntoIter = std::slice::Iter<'a, TrustAnchor>;

    fn into_iter(self) -> Self::IntoIter {
        self.anchors.iter()
    }
}
