//! Declarative library lists.
//!
//! A manifest names repositories, relocations applied to every library and
//! the libraries themselves. Keys are camelCase in both formats:
//!
//! ```json
//! {
//!   "version": 0,
//!   "repositories": ["https://jitpack.io/"],
//!   "relocations": [{ "pattern": "com{}google{}gson", "relocatedPattern": "my{}libs{}gson" }],
//!   "libraries": [
//!     { "groupId": "com{}google{}code{}gson", "artifactId": "gson", "version": "2.10.1",
//!       "checksum": "QkHBSncnw0/uplB+yAExij1KkPBw5FJWgQefuU7kxZM=" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, Relocation};
use crate::error::{DepotError, Result};

/// The only manifest format version understood.
pub const MANIFEST_VERSION: i64 = 0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Applied to every library, after the library's own relocations.
    #[serde(default)]
    pub relocations: Vec<RelocationEntry>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationEntry {
    pub pattern: String,
    pub relocated_pattern: String,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl RelocationEntry {
    pub fn to_relocation(&self) -> Relocation {
        let mut r = Relocation::new(&self.pattern, &self.relocated_pattern);
        for include in &self.includes {
            r = r.include(include);
        }
        for exclude in &self.excludes {
            r = r.exclude(exclude);
        }
        r
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionEntry {
    pub group_id: String,
    pub artifact_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Base64 SHA-256.
    #[serde(default, alias = "checksumFromBase64", skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_hex: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub relocations: Vec<RelocationEntry>,
    #[serde(default)]
    pub isolated_load: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_id: Option<String>,
    #[serde(default)]
    pub resolve_transitive_dependencies: bool,
    #[serde(default)]
    pub excluded_transitive_dependencies: Vec<ExclusionEntry>,
}

impl Manifest {
    /// Reads a manifest, TOML for `.toml` files and JSON otherwise.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| DepotError::io(format!("read manifest {}", path.display()), e))?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            Self::from_toml(&data)
        } else {
            Self::from_json(&data)
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(data)
            .map_err(|e| DepotError::Configuration(format!("malformed manifest: {}", e)))?;
        manifest.check_version()?;
        Ok(manifest)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(data)
            .map_err(|e| DepotError::Configuration(format!("malformed manifest: {}", e)))?;
        manifest.check_version()?;
        Ok(manifest)
    }

    fn check_version(&self) -> Result<()> {
        match self.version {
            Some(v) if v != MANIFEST_VERSION => Err(DepotError::Configuration(format!(
                "manifest is version {} but only version {} is supported",
                v, MANIFEST_VERSION
            ))),
            _ => Ok(()),
        }
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Builds every library, in declaration order.
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        self.libraries.iter().map(|l| self.artifact(l)).collect()
    }

    fn artifact(&self, lib: &LibraryEntry) -> Result<Artifact> {
        let mut b = Artifact::builder()
            .group_id(lib.group_id.as_str())
            .artifact_id(lib.artifact_id.as_str())
            .version(lib.version.as_str())
            .isolated_load(lib.isolated_load)
            .resolve_transitive(lib.resolve_transitive_dependencies);
        if let Some(c) = &lib.classifier {
            b = b.classifier(c.as_str());
        }
        if let Some(sum) = &lib.checksum {
            b = b.checksum_base64(sum);
        }
        if let Some(sum) = &lib.checksum_hex {
            b = b.checksum_hex(sum);
        }
        if let Some(id) = &lib.loader_id {
            b = b.loader_id(id.as_str());
        }
        for url in &lib.urls {
            b = b.url(url.as_str());
        }
        for repo in &lib.repositories {
            b = b.repository(repo);
        }
        for ex in &lib.excluded_transitive_dependencies {
            b = b.exclude_transitive(&ex.group_id, &ex.artifact_id);
        }
        for r in lib.relocations.iter().chain(&self.relocations) {
            b = b.relocate(r.to_relocation());
        }
        b.build().map_err(|e| match e {
            DepotError::InvalidArtifact(msg) => DepotError::Configuration(format!(
                "library {}:{}:{}: {}",
                lib.group_id, lib.artifact_id, lib.version, msg
            )),
            other => other,
        })
    }
}
