//! Candidate URL construction.
//!
//! Turns an [`Artifact`] plus the global repository list into the ordered,
//! deduplicated list of URLs the downloader tries. Snapshot artifacts go
//! through `maven-metadata.xml` first; a repository that cannot tell us the
//! current snapshot build simply contributes no candidate.

mod snapshot;

pub use snapshot::{parse_snapshot_metadata, SnapshotVersion};

use serde::{Deserialize, Serialize};

use crate::artifact::{path, Artifact};
use crate::http::{classify, FailureKind, Fetcher};

pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2/";
pub const SONATYPE: &str = "https://oss.sonatype.org/content/groups/public/";
pub const JITPACK: &str = "https://jitpack.io/";
pub const APACHE: &str = "https://repo.maven.apache.org/maven2/";

/// Name of the snapshot metadata document inside a version directory.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Order in which the artifact's own and the global repositories are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// Same as `LibraryFirst`.
    #[default]
    Default,
    LibraryFirst,
    GlobalFirst,
}

impl ResolutionMode {
    /// Orders the two repository lists for this mode.
    pub fn order<'a>(
        self,
        artifact_repositories: &'a [String],
        global_repositories: &'a [String],
    ) -> [&'a [String]; 2] {
        match self {
            ResolutionMode::Default | ResolutionMode::LibraryFirst => {
                [artifact_repositories, global_repositories]
            }
            ResolutionMode::GlobalFirst => [global_repositories, artifact_repositories],
        }
    }
}

/// Appends the trailing `/` a repository base URL needs.
pub fn normalize_repository(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// `file://` URL of the local Maven repository (`~/.m2/repository/`).
pub fn maven_local() -> Option<String> {
    let home = std::env::var_os("HOME")?;
    let dir = std::path::Path::new(&home).join(".m2").join("repository");
    url::Url::from_directory_path(dir)
        .ok()
        .map(|u| normalize_repository(u.as_str()))
}

/// Builds the ordered candidate list: direct URLs, then one URL per
/// repository in [`ResolutionMode`] order. Duplicates keep their first slot.
pub fn resolve_candidates(
    artifact: &Artifact,
    global_repositories: &[String],
    mode: ResolutionMode,
    fetcher: &Fetcher,
) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    let mut push = |url: String| {
        if !urls.contains(&url) {
            urls.push(url);
        }
    };

    for url in artifact.urls() {
        push(url.clone());
    }

    for list in mode.order(artifact.repositories(), global_repositories) {
        for repository in list {
            if artifact.is_snapshot() {
                if let Some(url) = resolve_snapshot(repository, artifact, fetcher) {
                    push(url);
                }
            } else {
                push(format!("{}{}", repository, artifact.path()));
            }
        }
    }
    urls
}

/// Asks `repository` for the current snapshot build of `artifact`.
fn resolve_snapshot(repository: &str, artifact: &Artifact, fetcher: &Fetcher) -> Option<String> {
    let url = format!("{}{}{}", repository, artifact.partial_path(), METADATA_FILE);
    let body = match fetcher.fetch(&url) {
        Ok(body) => body,
        Err(e) => {
            match classify(&e) {
                FailureKind::NotFound => tracing::debug!("file not found: {}", url),
                FailureKind::Timeout => tracing::debug!("connect timed out: {}", url),
                FailureKind::UnknownHost => tracing::debug!("unknown host: {}", url),
                _ => tracing::debug!(error = %e, "unexpected error fetching {}", url),
            }
            return None;
        }
    };
    let Some(snapshot) = parse_snapshot_metadata(&body) else {
        tracing::debug!("no snapshot information in {}", url);
        return None;
    };
    let version = snapshot.file_version(artifact.base_snapshot_version());
    Some(format!(
        "{}{}{}",
        repository,
        artifact.partial_path(),
        path::file_name(
            artifact.artifact_id(),
            &version,
            artifact.classifier(),
            artifact.extension()
        )
    ))
}
