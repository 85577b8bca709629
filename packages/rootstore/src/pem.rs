//! PEM extraction and armoring for certificate blobs
//!
//! Vendor artifacts arrive as concatenated PEM text, bare DER, or PEM mixed
//! with commentary. Everything funnels through [`extract_certificates`] so
//! that every vendor agrees on what counts as a certificate.

use ::pem::{EncodeConfig, LineEnding, Pem};
use rustls::pki_types::CertificateDer;
use rustls_pemfile::Item;

use crate::error::{Result, RootStoreError};

/// PEM label for certificate blocks
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Decode every `CERTIFICATE` block in `data`, in order.
///
/// Text outside PEM blocks and blocks of other types are skipped. The first
/// malformed block ends the scan; whatever was decoded before it is returned.
#[must_use]
pub fn extract_certificates(data: &[u8]) -> Vec<CertificateDer<'static>> {
    let mut certificates = Vec::new();
    let mut rest = data;

    loop {
        match rustls_pemfile::read_one_from_slice(rest) {
            Ok(Some((item, remaining))) => {
                if let Item::X509Certificate(der) = item {
                    certificates.push(der);
                }
                rest = remaining;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(
                    "Stopping PEM extraction after {} certificates: {:?}",
                    certificates.len(),
                    e
                );
                break;
            }
        }
    }

    certificates
}

/// Count the certificates [`extract_certificates`] would return
#[must_use]
pub fn count_certificates(data: &[u8]) -> usize {
    extract_certificates(data).len()
}

/// Wrap DER bytes in a `CERTIFICATE` PEM block (LF line endings)
#[must_use]
pub fn encode_certificate(der: &[u8]) -> String {
    let block = Pem::new(CERTIFICATE_LABEL, der.to_vec());
    ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Encoding of a single-certificate download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// PEM text, possibly mixed with other content
    Pem,
    /// One bare DER certificate
    Der,
}

impl BodyFormat {
    /// Turn a download body into PEM text for the store.
    ///
    /// PEM bodies pass through as text with a trailing newline; a body with
    /// no certificate blocks is kept as is and contributes nothing to the
    /// pool. DER bodies are armored only if they parse as one X.509
    /// certificate.
    ///
    /// # Errors
    ///
    /// Returns `RootStoreError::CertificateParse` if a DER body is not a
    /// well-formed certificate.
    pub fn normalize(self, body: &[u8]) -> Result<String> {
        match self {
            BodyFormat::Pem => {
                let mut text = String::from_utf8_lossy(body).into_owned();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                Ok(text)
            }
            BodyFormat::Der => match x509_parser::parse_x509_certificate(body) {
                Ok((rest, _)) if rest.is_empty() => Ok(encode_certificate(body)),
                Ok((rest, _)) => Err(RootStoreError::certificate(format!(
                    "{} trailing bytes after DER certificate",
                    rest.len()
                ))),
                Err(e) => Err(RootStoreError::certificate(format!(
                    "Response is not a DER certificate: {e}"
                ))),
            },
        }
    }
}
