//! Maven layout paths, relative to a repository root or the save directory.

use sha2::{Digest, Sha256};

use super::Relocation;

/// Token embedders write instead of `.` so that their own shading step leaves
/// coordinate strings alone.
pub const ESCAPE_TOKEN: &str = "{}";

/// Replaces every [`ESCAPE_TOKEN`] with a dot.
pub fn replace_with_dots(value: &str) -> String {
    value.replace(ESCAPE_TOKEN, ".")
}

/// `org/example/demo/1.0/` for `org.example:demo:1.0`.
pub fn partial_path(group_id: &str, artifact_id: &str, version: &str) -> String {
    format!("{}/{}/{}/", group_id.replace('.', "/"), artifact_id, version)
}

/// `demo-1.0[-classifier].jar`.
pub fn file_name(
    artifact_id: &str,
    version: &str,
    classifier: Option<&str>,
    extension: &str,
) -> String {
    match classifier {
        Some(c) => format!("{}-{}-{}.{}", artifact_id, version, c, extension),
        None => format!("{}-{}.{}", artifact_id, version, extension),
    }
}

/// Cache key of the relocated copy of `path`.
///
/// The suffix is the first 8 bytes of a SHA-256 over the rule list, so two rule
/// sets never share a cache entry and the key is stable across processes.
pub fn relocated_path(path: &str, extension: &str, rules: &[Relocation]) -> String {
    let stem = path
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(path);
    format!("{}-relocated-{}.{}", stem, rules_digest(rules), extension)
}

fn rules_digest(rules: &[Relocation]) -> String {
    let mut hasher = Sha256::new();
    for rule in rules {
        hasher.update(rule.pattern().as_bytes());
        hasher.update([0u8]);
        hasher.update(rule.relocated_pattern().as_bytes());
        hasher.update([0u8]);
        for include in rule.includes() {
            hasher.update(b"+");
            hasher.update(include.as_bytes());
            hasher.update([0u8]);
        }
        for exclude in rule.excludes() {
            hasher.update(b"-");
            hasher.update(exclude.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0x1eu8]);
    }
    hex::encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_uses_slashes() {
        assert_eq!(
            partial_path("org.apache.commons", "commons-lang3", "3.13.0"),
            "org/apache/commons/commons-lang3/3.13.0/"
        );
    }

    #[test]
    fn file_name_with_and_without_classifier() {
        assert_eq!(file_name("demo", "1.0", None, "jar"), "demo-1.0.jar");
        assert_eq!(
            file_name("demo", "1.0", Some("sources"), "jar"),
            "demo-1.0-sources.jar"
        );
    }

    #[test]
    fn escape_token_replaced() {
        assert_eq!(replace_with_dots("org{}apache{}commons"), "org.apache.commons");
        assert_eq!(replace_with_dots("plain"), "plain");
    }

    #[test]
    fn relocated_path_is_stable_and_rule_dependent() {
        let a = vec![Relocation::new("com.google", "shaded.com.google")];
        let b = vec![Relocation::new("com.google", "other.com.google")];
        let p = "x/demo/1.0/demo-1.0.jar";
        let ra = relocated_path(p, "jar", &a);
        assert_eq!(ra, relocated_path(p, "jar", &a.clone()));
        assert_ne!(ra, relocated_path(p, "jar", &b));
        assert!(ra.starts_with("x/demo/1.0/demo-1.0-relocated-"));
        assert!(ra.ends_with(".jar"));
        // 16 hex chars between the marker and the extension
        let hash = &ra["x/demo/1.0/demo-1.0-relocated-".len()..ra.len() - 4];
        assert_eq!(hash.len(), 16);
    }

    #[test]
    fn relocated_path_depends_on_filters() {
        let p = "x/demo/1.0/demo-1.0.jar";
        let plain = vec![Relocation::new("a", "b")];
        let filtered = vec![Relocation::new("a", "b").include("a.keep")];
        assert_ne!(
            relocated_path(p, "jar", &plain),
            relocated_path(p, "jar", &filtered)
        );
    }
}
