//! Coordinates excluded from transitive resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::replace_with_dots;

/// `(groupId, artifactId)` pair compared by value; the version never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedCoordinate {
    group_id: String,
    artifact_id: String,
}

impl ExcludedCoordinate {
    pub fn new(group_id: impl AsRef<str>, artifact_id: impl AsRef<str>) -> Self {
        Self {
            group_id: replace_with_dots(group_id.as_ref()),
            artifact_id: replace_with_dots(artifact_id.as_ref()),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

impl fmt::Display for ExcludedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_value_with_normalized_group() {
        let ex = ExcludedCoordinate::new("org{}slf4j", "slf4j-api");
        assert!(ex.matches("org.slf4j", "slf4j-api"));
        assert!(!ex.matches("org.slf4j", "slf4j-simple"));
        assert_eq!(ex, ExcludedCoordinate::new("org.slf4j", "slf4j-api"));
        assert_eq!(ex.to_string(), "org.slf4j:slf4j-api");
    }
}
