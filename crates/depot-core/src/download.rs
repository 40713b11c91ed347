//! Checksum-verified, cache-first artifact downloads.
//!
//! Candidates are tried strictly one at a time, in the order the repository
//! resolver produced them. A body is only written to the cache after it has
//! passed the checksum, and then only through a temp file and a rename.

use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::checksum::{sha256, to_base64};
use crate::error::{DepotError, Result};
use crate::http::{classify, FailureKind, FetchError, Fetcher};
use crate::repository::{resolve_candidates, ResolutionMode};
use crate::storage;

#[derive(Debug, Clone)]
pub struct Downloader {
    save_dir: PathBuf,
    fetcher: Fetcher,
}

impl Downloader {
    pub fn new(save_dir: impl Into<PathBuf>, fetcher: Fetcher) -> Self {
        Self {
            save_dir: save_dir.into(),
            fetcher,
        }
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Cache location of `artifact`, whether or not it exists yet.
    pub fn target(&self, artifact: &Artifact) -> PathBuf {
        self.save_dir.join(artifact.path())
    }

    /// Makes sure `artifact` is in the cache and returns its path.
    ///
    /// A cached release is returned without touching the network. A cached
    /// snapshot is deleted first and fetched again.
    pub fn acquire(
        &self,
        artifact: &Artifact,
        repositories: &[String],
        mode: ResolutionMode,
    ) -> Result<PathBuf> {
        let target = self.target(artifact);
        if target.exists() {
            if !artifact.is_snapshot() {
                return Ok(target);
            }
            fs::remove_file(&target).map_err(|e| {
                DepotError::io(format!("failed to delete stale snapshot {}", target.display()), e)
            })?;
        }

        let urls = resolve_candidates(artifact, repositories, mode, &self.fetcher);
        if urls.is_empty() {
            return Err(DepotError::Unresolved {
                artifact: artifact.to_string(),
            });
        }

        for url in &urls {
            let body = match self.fetch_verified(url, artifact.checksum()) {
                Ok(body) => body,
                Err(e) => {
                    self.report(artifact, url, &e);
                    continue;
                }
            };
            storage::write_atomic(&target, &body)?;
            tracing::info!("downloaded library {}", url);
            return Ok(target);
        }

        Err(DepotError::DownloadFailed {
            artifact: artifact.to_string(),
        })
    }

    /// GETs `url` and checks the body against `checksum` when one is given.
    pub fn fetch_verified(
        &self,
        url: &str,
        checksum: Option<&[u8; 32]>,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        let body = self.fetcher.fetch(url)?;
        if let Some(expected) = checksum {
            let actual = sha256(&body);
            if actual != *expected {
                return Err(FetchError::Integrity {
                    expected: *expected,
                    actual,
                });
            }
        }
        Ok(body)
    }

    fn report(&self, artifact: &Artifact, url: &str, e: &FetchError) {
        match (classify(e), e) {
            (FailureKind::Integrity, FetchError::Integrity { expected, actual }) => {
                tracing::warn!(
                    "*** INVALID CHECKSUM ***\n library: {}\n  url: {}\n  expected SHA-256: {}\n  actual SHA-256: {}",
                    artifact,
                    url,
                    to_base64(expected),
                    to_base64(actual)
                );
            }
            (FailureKind::Timeout, _) => tracing::warn!("read timed out: {}", url),
            (FailureKind::NotFound, _) => tracing::debug!("file not found: {}", url),
            (FailureKind::UnknownHost, _) => tracing::debug!("unknown host: {}", url),
            (FailureKind::Connection, _) => {
                tracing::debug!(error = %e, "connection failed: {}", url)
            }
            _ => tracing::debug!(error = %e, "unexpected failure downloading {}", url),
        }
    }
}
