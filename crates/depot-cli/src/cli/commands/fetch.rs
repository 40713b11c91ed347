//! Fetch command: acquire one artifact through the full load pipeline.

use anyhow::{bail, Result};
use clap::Args;
use depot_core::{ArtifactBuilder, Relocation};
use std::path::PathBuf;

use crate::cli::host::Session;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Coordinates as group:artifact:version[:classifier].
    pub coordinates: String,

    /// Extra repository for this artifact (repeatable).
    #[arg(long = "repo", value_name = "URL")]
    pub repositories: Vec<String>,

    /// Direct download URL, tried before any repository (repeatable).
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Expected SHA-256, base64 encoded.
    #[arg(long)]
    pub checksum: Option<String>,

    /// Also fetch the artifact's dependencies.
    #[arg(long)]
    pub transitive: bool,

    /// Dependency to skip, as group:artifact (repeatable).
    #[arg(long = "exclude", value_name = "GROUP:ARTIFACT")]
    pub excludes: Vec<String>,

    /// Package relocation, as from=to (repeatable).
    #[arg(long = "relocate", value_name = "FROM=TO")]
    pub relocations: Vec<String>,

    /// Load into an isolated unit instead of the host classpath.
    #[arg(long)]
    pub isolated: bool,

    /// Isolated unit to use; implies --isolated.
    #[arg(long, value_name = "ID")]
    pub loader_id: Option<String>,
}

impl FetchArgs {
    pub fn to_builder(&self) -> Result<ArtifactBuilder> {
        let mut b = ArtifactBuilder::from_coordinates(&self.coordinates)?
            .resolve_transitive(self.transitive)
            .isolated_load(self.isolated || self.loader_id.is_some());
        for repo in &self.repositories {
            b = b.repository(repo);
        }
        for url in &self.urls {
            b = b.url(url.as_str());
        }
        if let Some(sum) = &self.checksum {
            b = b.checksum_base64(sum);
        }
        if let Some(id) = &self.loader_id {
            b = b.loader_id(id.as_str());
        }
        for ex in &self.excludes {
            let Some((group, artifact)) = ex.split_once(':') else {
                bail!("--exclude expects group:artifact, got '{}'", ex);
            };
            b = b.exclude_transitive(group, artifact);
        }
        for rule in &self.relocations {
            let Some((from, to)) = rule.split_once('=') else {
                bail!("--relocate expects from=to, got '{}'", rule);
            };
            b = b.relocate(Relocation::new(from, to));
        }
        Ok(b)
    }
}

pub fn run_fetch(save_dir: Option<PathBuf>, args: &FetchArgs) -> Result<()> {
    let artifact = args.to_builder()?.build()?;
    let session = Session::open(save_dir)?;
    let path = session.engine.load(&artifact)?;
    println!("{}", path.display());
    session.print_classpaths()
}
