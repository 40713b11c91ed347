//! Transitive dependency orchestration.
//!
//! The dependency graph itself is computed by a [`DependencyGraph`]
//! collaborator that returns the full closure. This module builds the
//! request, filters the answer and turns every remaining entry into a child
//! [`Artifact`] that inherits the parent's loading and relocation policy.

use serde::{Deserialize, Serialize};

use crate::artifact::{path, Artifact, DEFAULT_EXTENSION};
use crate::error::{DepotError, Result};
use crate::lazy::Lazy;
use crate::repository::{normalize_repository, ResolutionMode};

/// Query sent to the dependency graph collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRequest {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Repositories to search, in precedence order.
    pub repositories: Vec<String>,
}

/// One entry of the dependency closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArtifact {
    pub group_id: String,
    pub artifact_id: String,
    /// Declared version; `2.1-SNAPSHOT` for a snapshot.
    pub base_version: String,
    /// File version; `2.1-20220617.013635-12` for a snapshot.
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    /// Repository the entry was found in, if the collaborator knows.
    #[serde(default)]
    pub repository: Option<String>,
}

/// Computes the dependency closure of one artifact.
pub trait DependencyGraph: Send + Sync {
    fn find_transitive(&self, request: &DependencyRequest) -> anyhow::Result<Vec<ResolvedArtifact>>;
}

#[derive(Debug)]
pub struct TransitiveResolver {
    graph: Lazy<dyn DependencyGraph>,
}

impl TransitiveResolver {
    pub fn new(graph: Lazy<dyn DependencyGraph>) -> Self {
        Self { graph }
    }

    /// Child artifacts of `artifact`, minus itself and its exclusions.
    ///
    /// Children never resolve transitively themselves: the collaborator
    /// already returned the whole closure.
    pub fn find_transitive(
        &self,
        artifact: &Artifact,
        global_repositories: &[String],
        mode: ResolutionMode,
    ) -> Result<Vec<Artifact>> {
        if global_repositories.is_empty() && artifact.repositories().is_empty() {
            return Err(DepotError::Configuration(format!(
                "cannot resolve transitive dependencies of '{}': no repositories",
                artifact
            )));
        }

        let request = request_for(artifact, global_repositories, mode);
        let graph = match self.graph.get() {
            Ok(Some(g)) => g,
            Ok(None) => {
                return Err(DepotError::Configuration(
                    "transitive resolution requested but no dependency resolver is configured"
                        .to_string(),
                ))
            }
            Err(e) => {
                return Err(DepotError::Configuration(format!(
                    "failed to initialize dependency resolver: {:#}",
                    e
                )))
            }
        };
        let resolved = graph
            .find_transitive(&request)
            .map_err(|source| DepotError::Transitive {
                artifact: artifact.to_string(),
                source,
            })?;

        let mut children = Vec::new();
        for dep in resolved {
            if dep.group_id == artifact.group_id() && dep.artifact_id == artifact.artifact_id() {
                continue;
            }
            if artifact.is_excluded(&dep.group_id, &dep.artifact_id) {
                tracing::debug!(
                    "skipping excluded dependency {}:{} of {}",
                    dep.group_id,
                    dep.artifact_id,
                    artifact
                );
                continue;
            }
            let child = child_of(artifact, &dep).map_err(|e| DepotError::Transitive {
                artifact: artifact.to_string(),
                source: e.into(),
            })?;
            children.push(child);
        }
        tracing::debug!("{} has {} transitive dependencies", artifact, children.len());
        Ok(children)
    }
}

/// Request for `artifact`, repositories ordered as for downloads.
pub fn request_for(
    artifact: &Artifact,
    global_repositories: &[String],
    mode: ResolutionMode,
) -> DependencyRequest {
    let mut repositories: Vec<String> = Vec::new();
    for list in mode.order(artifact.repositories(), global_repositories) {
        for repo in list {
            if !repositories.contains(repo) {
                repositories.push(repo.clone());
            }
        }
    }
    DependencyRequest {
        group_id: artifact.group_id().to_string(),
        artifact_id: artifact.artifact_id().to_string(),
        version: artifact.version().to_string(),
        classifier: artifact.classifier().map(str::to_string),
        repositories,
    }
}

fn child_of(parent: &Artifact, dep: &ResolvedArtifact) -> Result<Artifact> {
    let classifier = dep.classifier.as_deref().filter(|c| !c.is_empty());
    let mut builder = Artifact::builder()
        .group_id(dep.group_id.as_str())
        .artifact_id(dep.artifact_id.as_str())
        .version(dep.base_version.as_str())
        .isolated_load(parent.is_isolated_load());
    if let Some(c) = classifier {
        builder = builder.classifier(c);
    }
    if let Some(id) = parent.loader_id() {
        builder = builder.loader_id(id);
    }
    for rule in parent.relocations() {
        builder = builder.relocate(rule.clone());
    }

    match &dep.repository {
        Some(repo) => {
            builder = builder.url(direct_url(repo, dep, classifier));
        }
        None => {
            for repo in parent.repositories() {
                builder = builder.repository(repo);
            }
        }
    }
    builder.build()
}

/// Exact file URL of a resolved entry inside its origin repository.
fn direct_url(repository: &str, dep: &ResolvedArtifact, classifier: Option<&str>) -> String {
    format!(
        "{}{}{}",
        normalize_repository(repository),
        path::partial_path(
            &path::replace_with_dots(&dep.group_id),
            &dep.artifact_id,
            &dep.base_version
        ),
        path::file_name(&dep.artifact_id, &dep.version, classifier, DEFAULT_EXTENSION)
    )
}

/// Reads a JSON array of [`ResolvedArtifact`], the format command resolvers print.
pub fn parse_resolved(json: &[u8]) -> anyhow::Result<Vec<ResolvedArtifact>> {
    Ok(serde_json::from_slice(json)?)
}
