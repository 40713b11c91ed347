//! Load command: load every library in a manifest.

use anyhow::Result;
use depot_core::manifest::Manifest;
use std::path::{Path, PathBuf};

use crate::cli::host::Session;

pub fn run_load(save_dir: Option<PathBuf>, path: &Path) -> Result<()> {
    let session = Session::open(save_dir)?;
    let manifest = Manifest::from_path(path)?;
    let loaded = session.engine.configure(&manifest)?;
    tracing::info!("loaded {} libraries from {}", loaded.len(), path.display());
    session.print_classpaths()
}
