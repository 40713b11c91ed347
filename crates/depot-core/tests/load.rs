//! Integration test: the full load pipeline against a local HTTP repository.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::repo_server::RepoServer;
use common::{engine_builder, jar_path, RecordingHost};
use depot_core::checksum::{sha256, to_base64};
use depot_core::manifest::Manifest;
use depot_core::relocate::Relocator;
use depot_core::transitive::{DependencyGraph, DependencyRequest, ResolvedArtifact};
use depot_core::{Artifact, DepotError, Relocation};
use tempfile::tempdir;

/// Writes the input followed by every relocated pattern.
#[derive(Default)]
struct TaggingRelocator {
    calls: AtomicUsize,
}

impl Relocator for TaggingRelocator {
    fn relocate(&self, input: &Path, output: &Path, rules: &[Relocation]) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut bytes = fs::read(input)?;
        for rule in rules {
            bytes.push(b'|');
            bytes.extend_from_slice(rule.relocated_pattern().as_bytes());
        }
        fs::write(output, bytes)?;
        Ok(())
    }
}

/// Fixed closure; remembers every request.
struct StaticGraph {
    deps: Vec<ResolvedArtifact>,
    requests: Mutex<Vec<DependencyRequest>>,
}

impl DependencyGraph for StaticGraph {
    fn find_transitive(
        &self,
        request: &DependencyRequest,
    ) -> anyhow::Result<Vec<ResolvedArtifact>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.deps.clone())
    }
}

fn dep(group: &str, artifact: &str, version: &str, repository: Option<&str>) -> ResolvedArtifact {
    ResolvedArtifact {
        group_id: group.to_string(),
        artifact_id: artifact.to_string(),
        base_version: version.to_string(),
        version: version.to_string(),
        classifier: None,
        repository: repository.map(str::to_string),
    }
}

#[test]
fn verified_download_is_handed_to_host_once() {
    let server = RepoServer::start();
    let body: Vec<u8> = (0u8..=255).cycle().take(32 * 1024).collect();
    let path = jar_path("org.apache.commons", "commons-lang3", "3.13.0");
    server.put(&path, body.clone());

    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let engine = engine_builder(cache.path(), &host)
        .repository(server.url())
        .build()
        .unwrap();
    let a = Artifact::builder()
        .group_id("org{}apache{}commons")
        .artifact_id("commons-lang3")
        .version("3.13.0")
        .checksum_base64(&to_base64(&sha256(&body)))
        .build()
        .unwrap();

    let loaded = engine.load(&a).unwrap();
    assert_eq!(loaded, cache.path().join(&path));
    assert_eq!(fs::read(&loaded).unwrap(), body);
    assert_eq!(*host.files.lock().unwrap(), [loaded]);
    assert_eq!(server.hits(&path), 1);
}

#[test]
fn isolated_units_by_loader_id() {
    let server = RepoServer::start();
    for name in ["x", "y", "z"] {
        server.put(&jar_path("org.example", name, "1.0"), name.as_bytes().to_vec());
    }
    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let engine = engine_builder(cache.path(), &host)
        .repository(server.url())
        .build()
        .unwrap();
    let build = |name: &str, loader: Option<&str>| {
        let mut b = Artifact::builder()
            .group_id("org.example")
            .artifact_id(name)
            .version("1.0")
            .isolated_load(true);
        if let Some(id) = loader {
            b = b.loader_id(id);
        }
        b.build().unwrap()
    };

    engine
        .load_all(&[build("x", Some("L")), build("y", Some("L")), build("z", None)])
        .unwrap();

    let l = engine.isolated_unit("L").expect("unit L registered");
    let global = engine.global_isolated_unit().unwrap();
    assert!(!Arc::ptr_eq(&l, &global));
    assert!(Arc::ptr_eq(&l, &engine.isolated_unit("L").unwrap()));
    assert!(host.files.lock().unwrap().is_empty());
    let handle = l.load_class("org.example.X").unwrap();
    assert_eq!(handle.downcast_ref::<String>().map(String::as_str), Some("org.example.X"));
}

#[test]
fn relocation_keys_differ_per_rule_set_and_are_reused() {
    let server = RepoServer::start();
    let path = jar_path("com.google.code.gson", "gson", "2.10.1");
    server.put(&path, b"gson".to_vec());
    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let relocator = Arc::new(TaggingRelocator::default());
    let engine = engine_builder(cache.path(), &host)
        .repository(server.url())
        .relocator(relocator.clone())
        .build()
        .unwrap();
    let with_rule = |target: &str| {
        Artifact::builder()
            .group_id("com.google.code.gson")
            .artifact_id("gson")
            .version("2.10.1")
            .relocate(Relocation::new("com{}google{}gson", target))
            .build()
            .unwrap()
    };
    let a = with_rule("a{}gson");
    let b = with_rule("b{}gson");

    let pa = engine.load(&a).unwrap();
    let pb = engine.load(&b).unwrap();
    assert_ne!(pa, pb);
    assert_eq!(fs::read(&pa).unwrap(), b"gson|a.gson");
    assert_eq!(fs::read(&pb).unwrap(), b"gson|b.gson");

    let again = engine.load(&a).unwrap();
    assert_eq!(again, pa);
    assert_eq!(relocator.calls.load(Ordering::SeqCst), 2);
    // One download shared by both relocated copies.
    assert_eq!(server.hits(&path), 1);
}

#[test]
fn missing_relocator_is_reported() {
    let server = RepoServer::start();
    server.put(&jar_path("g", "a", "1"), b"a".to_vec());
    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let engine = engine_builder(cache.path(), &host)
        .repository(server.url())
        .build()
        .unwrap();
    let a = Artifact::builder()
        .group_id("g")
        .artifact_id("a")
        .version("1")
        .relocate(Relocation::new("x", "y"))
        .build()
        .unwrap();
    assert!(matches!(engine.load(&a), Err(DepotError::Configuration(_))));
    assert!(host.files.lock().unwrap().is_empty());
}

#[test]
fn transitive_exclusions_and_origin_urls() {
    let central = RepoServer::start();
    let other = RepoServer::start();
    central.put(&jar_path("org.example", "app", "1.0"), b"app".to_vec());
    central.put(&jar_path("org.slf4j", "slf4j-api", "2.0.9"), b"api".to_vec());
    other.put(&jar_path("com.example", "util", "3.1"), b"util".to_vec());

    let graph = Arc::new(StaticGraph {
        deps: vec![
            dep("org.slf4j", "slf4j-api", "2.0.9", None),
            dep("org.slf4j", "slf4j-simple", "2.0.9", None),
            dep("com.example", "util", "3.1", Some(other.url())),
        ],
        requests: Mutex::new(Vec::new()),
    });
    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let engine = engine_builder(cache.path(), &host)
        .repository(central.url())
        .dependency_graph(graph.clone())
        .build()
        .unwrap();
    let app = Artifact::builder()
        .group_id("org.example")
        .artifact_id("app")
        .version("1.0")
        .resolve_transitive(true)
        .exclude_transitive("org{}slf4j", "slf4j-simple")
        .build()
        .unwrap();

    let children = engine.find_transitive(&app).unwrap();
    let names: Vec<&str> = children.iter().map(|c| c.artifact_id()).collect();
    assert_eq!(names, ["slf4j-api", "util"]);

    engine.load(&app).unwrap();
    let loaded: Vec<String> = host
        .files
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(loaded, ["slf4j-api-2.0.9.jar", "util-3.1.jar", "app-1.0.jar"]);
    assert_eq!(other.hits(&jar_path("com.example", "util", "3.1")), 1);
    assert_eq!(central.hits(&jar_path("org.slf4j", "slf4j-simple", "2.0.9")), 0);

    let requests = graph.requests.lock().unwrap();
    assert_eq!(requests[0].repositories, [central.url()]);
}

#[test]
fn manifest_configures_repositories_and_loads_libraries() {
    let server = RepoServer::start();
    server.put(&jar_path("org.example", "first", "1.0"), b"first".to_vec());
    server.put(&jar_path("org.example", "second", "2.0"), b"second".to_vec());
    let manifest = Manifest::from_json(&format!(
        r#"{{
            "version": 0,
            "repositories": ["{}"],
            "libraries": [
                {{ "groupId": "org{{}}example", "artifactId": "first", "version": "1.0",
                   "checksum": "{}" }},
                {{ "groupId": "org.example", "artifactId": "second", "version": "2.0",
                   "isolatedLoad": true, "loaderId": "plugins" }}
            ]
        }}"#,
        server.url(),
        to_base64(&sha256(b"first"))
    ))
    .unwrap();

    let cache = tempdir().unwrap();
    let host = Arc::new(RecordingHost::default());
    let engine = engine_builder(cache.path(), &host).build().unwrap();
    let loaded = engine.configure(&manifest).unwrap();

    assert_eq!(engine.repositories(), [server.url()]);
    assert_eq!(loaded.len(), 2);
    assert_eq!(*host.files.lock().unwrap(), [loaded[0].clone()]);
    assert!(engine.isolated_unit("plugins").is_some());
}
