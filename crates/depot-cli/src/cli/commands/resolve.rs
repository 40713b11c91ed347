//! Resolve command: print candidate URLs in the order they would be tried.

use anyhow::Result;
use depot_core::ArtifactBuilder;
use std::path::PathBuf;

use crate::cli::host::Session;

pub fn run_resolve(
    save_dir: Option<PathBuf>,
    coordinates: &str,
    repositories: &[String],
) -> Result<()> {
    let session = Session::open(save_dir)?;
    let mut builder = ArtifactBuilder::from_coordinates(coordinates)?;
    for repo in repositories {
        builder = builder.repository(repo);
    }
    let artifact = builder.build()?;

    let candidates = session.engine.resolve_candidates(&artifact);
    if candidates.is_empty() {
        println!("No candidate URLs for {}.", coordinates);
        return Ok(());
    }
    for url in candidates {
        println!("{}", url);
    }
    println!("cache: {}", session.engine.save_dir().join(artifact.path()).display());
    Ok(())
}
