//! Cached namespace relocation.
//!
//! The rewrite itself is done by a [`Relocator`]. This module only decides
//! whether a rewrite is needed and makes sure its output appears under the
//! relocated cache key atomically.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::Relocation;
use crate::error::{DepotError, Result};
use crate::lazy::Lazy;
use crate::storage::{self, TempFile};

/// Rewrites the package names inside an archive.
///
/// `output` does not exist when called; the implementation creates it.
pub trait Relocator: Send + Sync {
    fn relocate(&self, input: &Path, output: &Path, rules: &[Relocation]) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub struct RelocationCache {
    save_dir: PathBuf,
    relocator: Lazy<dyn Relocator>,
}

impl RelocationCache {
    pub fn new(save_dir: impl Into<PathBuf>, relocator: Lazy<dyn Relocator>) -> Self {
        Self {
            save_dir: save_dir.into(),
            relocator,
        }
    }

    /// Relocates `input` into `save_dir/relocated_path` unless that file exists.
    pub fn relocate(
        &self,
        input: &Path,
        relocated_path: &str,
        rules: &[Relocation],
    ) -> Result<PathBuf> {
        let output = self.save_dir.join(relocated_path);
        if output.exists() {
            return Ok(output);
        }

        let relocator = self.relocator()?;
        storage::ensure_parent(&output)?;
        let tmp = TempFile::beside(&output);
        relocator
            .relocate(input, tmp.path(), rules)
            .map_err(|source| DepotError::Relocation {
                input: input.to_path_buf(),
                source,
            })?;
        if !tmp.path().exists() {
            return Err(DepotError::Relocation {
                input: input.to_path_buf(),
                source: anyhow::anyhow!("relocator produced no output"),
            });
        }
        tmp.persist(&output)?;
        tracing::info!("relocated {} to {}", input.display(), output.display());
        Ok(output)
    }

    fn relocator(&self) -> Result<Arc<dyn Relocator>> {
        match self.relocator.get() {
            Ok(Some(r)) => Ok(r),
            Ok(None) => Err(DepotError::Configuration(
                "artifact has relocations but no relocator is configured".to_string(),
            )),
            Err(e) => Err(DepotError::Configuration(format!(
                "failed to initialize relocator: {:#}",
                e
            ))),
        }
    }
}
