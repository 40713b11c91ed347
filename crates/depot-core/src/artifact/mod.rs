//! Immutable artifact descriptors.
//!
//! An [`Artifact`] names one fetchable Maven file plus the policy the engine
//! applies to it: where to look, what checksum to enforce, how to relocate it,
//! whether to resolve its dependencies and which loader receives it. Every
//! cache path is derived once in the builder and never recomputed.

mod builder;
mod excluded;
pub mod path;
mod relocation;

pub use builder::ArtifactBuilder;
pub use excluded::ExcludedCoordinate;
pub use relocation::Relocation;

use std::fmt;

/// Suffix that marks a floating snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Default file extension of a Maven artifact.
pub const DEFAULT_EXTENSION: &str = "jar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub(crate) urls: Vec<String>,
    pub(crate) repositories: Vec<String>,
    pub(crate) group_id: String,
    pub(crate) artifact_id: String,
    pub(crate) version: String,
    pub(crate) classifier: Option<String>,
    pub(crate) extension: String,
    pub(crate) checksum: Option<[u8; 32]>,
    pub(crate) relocations: Vec<Relocation>,
    pub(crate) path: String,
    pub(crate) partial_path: String,
    pub(crate) relocated_path: Option<String>,
    pub(crate) isolated_load: bool,
    pub(crate) loader_id: Option<String>,
    pub(crate) resolve_transitive: bool,
    pub(crate) excluded_transitive: Vec<ExcludedCoordinate>,
}

impl Artifact {
    pub fn builder() -> ArtifactBuilder {
        ArtifactBuilder::default()
    }

    /// Direct download URLs, tried before any repository.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Repository base URLs declared on this artifact, each ending in `/`.
    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Expected SHA-256 of the artifact file.
    pub fn checksum(&self) -> Option<&[u8; 32]> {
        self.checksum.as_ref()
    }

    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    pub fn has_relocations(&self) -> bool {
        !self.relocations.is_empty()
    }

    /// Maven layout path of the artifact file, e.g.
    /// `org/example/demo/1.0/demo-1.0.jar`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory part of [`Artifact::path`], ending in `/`.
    pub fn partial_path(&self) -> &str {
        &self.partial_path
    }

    /// Cache path of the relocated copy; `None` without relocations.
    pub fn relocated_path(&self) -> Option<&str> {
        self.relocated_path.as_deref()
    }

    pub fn is_isolated_load(&self) -> bool {
        self.isolated_load
    }

    pub fn loader_id(&self) -> Option<&str> {
        self.loader_id.as_deref()
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }

    /// Version with a trailing `-SNAPSHOT` removed.
    pub fn base_snapshot_version(&self) -> &str {
        self.version
            .strip_suffix(SNAPSHOT_SUFFIX)
            .unwrap_or(&self.version)
    }

    pub fn resolve_transitive(&self) -> bool {
        self.resolve_transitive
    }

    pub fn excluded_transitive(&self) -> &[ExcludedCoordinate] {
        &self.excluded_transitive
    }

    /// True if `(group_id, artifact_id)` is excluded from transitive resolution.
    pub fn is_excluded(&self, group_id: &str, artifact_id: &str) -> bool {
        self.excluded_transitive
            .iter()
            .any(|e| e.matches(group_id, artifact_id))
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        Ok(())
    }
}
