//! Fluent builder for [`Artifact`].

use base64::Engine as _;

use super::path::{self, replace_with_dots};
use super::relocation::normalize_rules;
use super::{Artifact, ExcludedCoordinate, Relocation, DEFAULT_EXTENSION};
use crate::error::{DepotError, Result};
use crate::repository::normalize_repository;

#[derive(Debug, Clone, Default)]
pub struct ArtifactBuilder {
    urls: Vec<String>,
    repositories: Vec<String>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    classifier: Option<String>,
    extension: Option<String>,
    checksum: Option<std::result::Result<Vec<u8>, String>>,
    relocations: Vec<Relocation>,
    isolated_load: bool,
    loader_id: Option<String>,
    resolve_transitive: bool,
    excluded_transitive: Vec<ExcludedCoordinate>,
}

impl ArtifactBuilder {
    /// Starts a builder from `group:artifact:version[:classifier]`.
    pub fn from_coordinates(coordinates: &str) -> Result<Self> {
        let parts: Vec<&str> = coordinates.split(':').collect();
        let (group, artifact, version, classifier) = match parts.as_slice() {
            [g, a, v] => (*g, *a, *v, None),
            [g, a, v, c] => (*g, *a, *v, Some(*c)),
            _ => {
                return Err(DepotError::InvalidArtifact(format!(
                    "expected group:artifact:version[:classifier], got '{}'",
                    coordinates
                )))
            }
        };
        let mut builder = Self::default()
            .group_id(group)
            .artifact_id(artifact)
            .version(version);
        if let Some(c) = classifier {
            builder = builder.classifier(c);
        }
        Ok(builder)
    }

    /// Adds a direct download URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    /// Adds a repository base URL; a trailing `/` is appended if missing.
    pub fn repository(mut self, url: impl AsRef<str>) -> Self {
        self.repositories.push(normalize_repository(url.as_ref()));
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the classifier; an empty string means none.
    pub fn classifier(mut self, classifier: impl Into<String>) -> Self {
        let c = classifier.into();
        self.classifier = (!c.is_empty()).then_some(c);
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Raw SHA-256 digest.
    pub fn checksum(mut self, checksum: impl Into<Vec<u8>>) -> Self {
        self.checksum = Some(Ok(checksum.into()));
        self
    }

    /// Base64-encoded SHA-256 digest.
    pub fn checksum_base64(mut self, checksum: &str) -> Self {
        self.checksum = Some(
            base64::engine::general_purpose::STANDARD
                .decode(checksum.trim())
                .map_err(|e| format!("checksum is not valid base64: {}", e)),
        );
        self
    }

    /// Hex-encoded SHA-256 digest.
    pub fn checksum_hex(mut self, checksum: &str) -> Self {
        self.checksum = Some(
            hex::decode(checksum.trim()).map_err(|e| format!("checksum is not valid hex: {}", e)),
        );
        self
    }

    pub fn relocate(mut self, relocation: Relocation) -> Self {
        self.relocations.push(relocation);
        self
    }

    pub fn isolated_load(mut self, isolated_load: bool) -> Self {
        self.isolated_load = isolated_load;
        self
    }

    pub fn loader_id(mut self, loader_id: impl Into<String>) -> Self {
        self.loader_id = Some(loader_id.into());
        self
    }

    pub fn resolve_transitive(mut self, resolve: bool) -> Self {
        self.resolve_transitive = resolve;
        self
    }

    pub fn exclude_transitive(mut self, group_id: &str, artifact_id: &str) -> Self {
        self.excluded_transitive
            .push(ExcludedCoordinate::new(group_id, artifact_id));
        self
    }

    pub fn build(self) -> Result<Artifact> {
        let group_id = replace_with_dots(&required(self.group_id, "groupId")?);
        let artifact_id = replace_with_dots(&required(self.artifact_id, "artifactId")?);
        let version = required(self.version, "version")?;

        let checksum = match self.checksum {
            None => None,
            Some(Err(msg)) => return Err(DepotError::InvalidArtifact(msg)),
            Some(Ok(bytes)) => Some(<[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
                DepotError::InvalidArtifact(format!(
                    "checksum must be a 32-byte SHA-256 digest, got {} bytes",
                    bytes.len()
                ))
            })?),
        };

        let extension = self
            .extension
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        let relocations = normalize_rules(self.relocations);

        let partial_path = path::partial_path(&group_id, &artifact_id, &version);
        let path = format!(
            "{}{}",
            partial_path,
            path::file_name(&artifact_id, &version, self.classifier.as_deref(), &extension)
        );
        let relocated_path = (!relocations.is_empty())
            .then(|| path::relocated_path(&path, &extension, &relocations));

        let mut excluded_transitive: Vec<ExcludedCoordinate> = Vec::new();
        for ex in self.excluded_transitive {
            if !excluded_transitive.contains(&ex) {
                excluded_transitive.push(ex);
            }
        }

        Ok(Artifact {
            urls: dedup(self.urls),
            repositories: dedup(self.repositories),
            group_id,
            artifact_id,
            version,
            classifier: self.classifier,
            extension,
            checksum,
            relocations,
            path,
            partial_path,
            relocated_path,
            isolated_load: self.isolated_load,
            loader_id: self.loader_id,
            resolve_transitive: self.resolve_transitive,
            excluded_transitive,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(DepotError::InvalidArtifact(format!("{} is required", name)));
    }
    Ok(value)
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
