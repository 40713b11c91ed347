//! Namespace relocation rules handed to the rewrite collaborator.

use std::collections::BTreeSet;

use serde::Serialize;

use super::path::replace_with_dots;

/// One search/replace rule plus optional include/exclude filters.
///
/// All patterns have the `{}` escape token replaced at construction, so the
/// rewrite collaborator always sees plain dotted names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relocation {
    pattern: String,
    relocated_pattern: String,
    includes: BTreeSet<String>,
    excludes: BTreeSet<String>,
}

impl Relocation {
    pub fn new(pattern: impl AsRef<str>, relocated_pattern: impl AsRef<str>) -> Self {
        Self {
            pattern: replace_with_dots(pattern.as_ref()),
            relocated_pattern: replace_with_dots(relocated_pattern.as_ref()),
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
        }
    }

    /// Restrict the rule to names matching `include`.
    pub fn include(mut self, include: impl AsRef<str>) -> Self {
        self.includes.insert(replace_with_dots(include.as_ref()));
        self
    }

    /// Never apply the rule to names matching `exclude`.
    pub fn exclude(mut self, exclude: impl AsRef<str>) -> Self {
        self.excludes.insert(replace_with_dots(exclude.as_ref()));
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn relocated_pattern(&self) -> &str {
        &self.relocated_pattern
    }

    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(String::as_str)
    }

    pub fn excludes(&self) -> impl Iterator<Item = &str> {
        self.excludes.iter().map(String::as_str)
    }

    /// A rule whose pattern equals its replacement rewrites nothing.
    pub fn is_identity(&self) -> bool {
        self.pattern == self.relocated_pattern
    }
}

/// Drops identity rules and exact duplicates, keeping first occurrences.
pub(crate) fn normalize_rules(rules: Vec<Relocation>) -> Vec<Relocation> {
    let mut out: Vec<Relocation> = Vec::with_capacity(rules.len());
    for rule in rules {
        if rule.is_identity() || out.contains(&rule) {
            continue;
        }
        out.push(rule);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_normalized() {
        let r = Relocation::new("com{}google{}gson", "my{}lib{}gson")
            .include("com{}google{}gson{}internal")
            .exclude("com{}google{}gson{}annotations");
        assert_eq!(r.pattern(), "com.google.gson");
        assert_eq!(r.relocated_pattern(), "my.lib.gson");
        assert_eq!(r.includes().collect::<Vec<_>>(), ["com.google.gson.internal"]);
        assert_eq!(
            r.excludes().collect::<Vec<_>>(),
            ["com.google.gson.annotations"]
        );
    }

    #[test]
    fn normalize_drops_identity_and_duplicates() {
        let rules = vec![
            Relocation::new("a", "b"),
            Relocation::new("c", "c"),
            Relocation::new("a", "b"),
            Relocation::new("a", "b").include("a.x"),
        ];
        let out = normalize_rules(rules);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Relocation::new("a", "b"));
        assert_eq!(out[1], Relocation::new("a", "b").include("a.x"));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&Relocation::new("a", "b").include("a.c")).unwrap();
        assert_eq!(
            json,
            r#"{"pattern":"a","relocatedPattern":"b","includes":["a.c"],"excludes":[]}"#
        );
    }
}
