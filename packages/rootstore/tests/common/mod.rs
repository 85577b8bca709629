//! Shared fixtures for integration tests

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rcgen::{CertificateParams, DnType, KeyPair};
use rootstore::{Fetcher, RetryPolicy, RootStore, RootStoreError, StoreConfig, VendorEndpoints};

/// A freshly generated self-signed certificate
pub struct TestCert {
    pub der: Vec<u8>,
    pub pem: String,
}

pub fn generate_cert(common_name: &str) -> TestCert {
    let mut params = CertificateParams::new(vec![format!("{common_name}.test")])
        .expect("Failed to create certificate parameters");
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    let key_pair = KeyPair::generate().expect("Failed to generate key pair");
    let cert = params
        .self_signed(&key_pair)
        .expect("Failed to create self-signed certificate");

    TestCert {
        der: cert.der().to_vec(),
        pem: cert.pem(),
    }
}

/// Canned reply for a URL
#[derive(Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

/// In-memory fetcher that counts requests per URL
#[derive(Default)]
pub struct StaticFetcher {
    replies: HashMap<String, Reply>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body.into()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> rootstore::Result<Vec<u8>> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        match self.replies.get(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(RootStoreError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(RootStoreError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

pub const APPLE_URL: &str = "https://fixtures.test/apple.tar.gz";
pub const CHROMIUM_URL: &str = "https://fixtures.test/root_store.certs?format=TEXT";
pub const MICROSOFT_REPORT_URL: &str = "https://fixtures.test/microsoft/report";
pub const MICROSOFT_DOWNLOAD_URL: &str = "https://fixtures.test/microsoft/crt/";
pub const NSS_URL: &str = "https://fixtures.test/nss.csv";
pub const NSS_PEM_COLUMN: usize = 2;

/// Config rooted at `root` with every endpoint pointing at fixtures
pub fn fixture_config(root: &Path) -> StoreConfig {
    let endpoints = VendorEndpoints {
        apple_archive_url: Some(APPLE_URL.to_string()),
        chromium_url: CHROMIUM_URL.to_string(),
        microsoft_report_url: MICROSOFT_REPORT_URL.to_string(),
        microsoft_download_url: MICROSOFT_DOWNLOAD_URL.to_string(),
        nss_csv_url: NSS_URL.to_string(),
        nss_pem_column: NSS_PEM_COLUMN,
        ..VendorEndpoints::default()
    };

    StoreConfig::new(root)
        .unwrap()
        .with_endpoints(endpoints)
        .with_retry(
            RetryPolicy::default()
                .with_delay(Duration::ZERO)
                .with_max_passes(3),
        )
}

pub fn fixture_store(root: &Path, fetcher: Arc<StaticFetcher>) -> RootStore {
    RootStore::with_fetcher(fixture_config(root), fetcher)
}

/// Microsoft report page with `(status, sha1)` rows
pub fn microsoft_report(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(status, sha1)| {
            format!(
                "<tr class=\"dataRow\">\
                 <td><span>{status}</span></td>\
                 <td><span>Example CA Owner</span></td>\
                 <td><span>Example Root</span></td>\
                 <td><span>{sha1}</span></td>\
                 </tr>"
            )
        })
        .collect();
    format!("<html><body><table><tr><th>Status</th></tr>{rows}</table></body></html>")
}

/// Older Microsoft report page with `(status, crt.sh link)` rows
pub fn microsoft_link_report(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(status, link)| {
            format!(
                "<tr class=\"dataRow\">\
                 <td><span>{status}</span></td>\
                 <td><span>Example CA Owner</span></td>\
                 <td><a href=\"{link}\">crt.sh</a></td>\
                 </tr>"
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

pub fn microsoft_cert_url(sha1: &str) -> String {
    format!("{MICROSOFT_DOWNLOAD_URL}{sha1}.crt")
}

/// CCADB-style CSV with the PEM in column `NSS_PEM_COLUMN`, single quoted
pub fn nss_csv(pems: &[&str]) -> String {
    let mut csv = String::from("Owner,Certificate Name,PEM Info\n");
    for (i, pem) in pems.iter().enumerate() {
        csv.push_str(&format!("Owner {i},Root {i},\"'{}'\"\n", pem.trim_end()));
    }
    csv
}

/// Gzipped tarball shaped like a security_certificates release
pub fn apple_archive(roots: &[(&str, &[u8])]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let prefix = "security_certificates-security_certificates-1.0";
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let add_dir = |builder: &mut tar::Builder<GzEncoder<Vec<u8>>>, path: &str| {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        header.set_cksum();
        builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
    };
    let add_file = |builder: &mut tar::Builder<GzEncoder<Vec<u8>>>, path: &str, data: &[u8]| {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(data.len() as u64);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    };

    add_dir(&mut builder, &format!("{prefix}/"));
    add_file(&mut builder, &format!("{prefix}/README.md"), b"security certificates");
    add_dir(&mut builder, &format!("{prefix}/tools/"));
    add_file(&mut builder, &format!("{prefix}/tools/build.sh"), b"#!/bin/sh\n");
    add_dir(&mut builder, &format!("{prefix}/certificates/"));
    add_dir(&mut builder, &format!("{prefix}/certificates/distrusted/"));
    add_file(
        &mut builder,
        &format!("{prefix}/certificates/distrusted/old.cer"),
        b"not a root",
    );
    add_dir(&mut builder, &format!("{prefix}/certificates/roots/"));
    add_file(
        &mut builder,
        &format!("{prefix}/certificates/roots/.cvsignore"),
        b"*.o\n",
    );
    for (name, der) in roots {
        add_file(
            &mut builder,
            &format!("{prefix}/certificates/roots/{name}"),
            der,
        );
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Number of `BEGIN CERTIFICATE` markers in a store file
pub fn count_blocks(pem: &str) -> usize {
    pem.matches("-----BEGIN CERTIFICATE-----").count()
}
