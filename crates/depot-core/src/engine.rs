//! The engine: one save directory, one global repository list, lazily built
//! collaborators and the isolated-unit registry, wired into the
//! acquire → transitive → relocate → load pipeline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::artifact::{Artifact, Relocation};
use crate::config::DepotConfig;
use crate::download::Downloader;
use crate::error::{DepotError, Result};
use crate::external::{CommandGraph, CommandRelocator};
use crate::http::Fetcher;
use crate::lazy::Lazy;
use crate::loader::{HostLoader, IsolatedUnit, IsolatedUnitFactory, LoaderRegistry};
use crate::manifest::Manifest;
use crate::relocate::{RelocationCache, Relocator};
use crate::repository::{self, normalize_repository, ResolutionMode, MAVEN_CENTRAL};
use crate::transitive::{DependencyGraph, TransitiveResolver};

pub struct EngineBuilder {
    save_dir: PathBuf,
    repositories: Vec<String>,
    mode: ResolutionMode,
    fetcher: Fetcher,
    relocator: Lazy<dyn Relocator>,
    dependency_graph: Lazy<dyn DependencyGraph>,
    host: Option<Arc<dyn HostLoader>>,
    unit_factory: Option<Arc<dyn IsolatedUnitFactory>>,
}

impl EngineBuilder {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            repositories: Vec::new(),
            mode: ResolutionMode::Default,
            fetcher: Fetcher::default(),
            relocator: Lazy::unset(),
            dependency_graph: Lazy::unset(),
            host: None,
            unit_factory: None,
        }
    }

    /// Save directory, repositories, resolution mode and command
    /// collaborators from `config`.
    pub fn from_config(config: &DepotConfig) -> anyhow::Result<Self> {
        let mut builder = Self::new(config.save_dir()?).resolution_mode(config.resolution_mode);
        for repo in &config.repositories {
            builder = builder.repository(repo);
        }
        if let Some(spec) = config.relocator.clone() {
            builder = builder.relocator_with(move || {
                Ok(Arc::new(CommandRelocator::new(spec.clone())?) as Arc<dyn Relocator>)
            });
        }
        if let Some(spec) = config.dependency_resolver.clone() {
            builder = builder.dependency_graph_with(move || {
                Ok(Arc::new(CommandGraph::new(spec.clone())?) as Arc<dyn DependencyGraph>)
            });
        }
        Ok(builder)
    }

    pub fn save_dir(mut self, save_dir: impl Into<PathBuf>) -> Self {
        self.save_dir = save_dir.into();
        self
    }

    pub fn repository(mut self, url: impl AsRef<str>) -> Self {
        let url = normalize_repository(url.as_ref());
        if !self.repositories.contains(&url) {
            self.repositories.push(url);
        }
        self
    }

    pub fn resolution_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn relocator(mut self, relocator: Arc<dyn Relocator>) -> Self {
        self.relocator = Lazy::ready(relocator);
        self
    }

    /// Relocator built on the first relocation, at most once.
    pub fn relocator_with<F>(mut self, init: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Relocator>> + Send + Sync + 'static,
    {
        self.relocator = Lazy::new(init);
        self
    }

    pub fn dependency_graph(mut self, graph: Arc<dyn DependencyGraph>) -> Self {
        self.dependency_graph = Lazy::ready(graph);
        self
    }

    /// Dependency graph built on the first transitive lookup, at most once.
    pub fn dependency_graph_with<F>(mut self, init: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn DependencyGraph>> + Send + Sync + 'static,
    {
        self.dependency_graph = Lazy::new(init);
        self
    }

    pub fn host_loader(mut self, host: Arc<dyn HostLoader>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn isolated_unit_factory(mut self, factory: Arc<dyn IsolatedUnitFactory>) -> Self {
        self.unit_factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let host = self.host.ok_or_else(|| {
            DepotError::Configuration("a host loader is required to build an engine".to_string())
        })?;
        let factory = self
            .unit_factory
            .unwrap_or_else(|| Arc::new(NoIsolation) as Arc<dyn IsolatedUnitFactory>);
        tracing::debug!(
            "engine save dir {}, {} repositories, {:?}",
            self.save_dir.display(),
            self.repositories.len(),
            self.mode
        );
        Ok(Engine {
            relocations: RelocationCache::new(self.save_dir.clone(), self.relocator),
            downloader: Downloader::new(self.save_dir, self.fetcher),
            repositories: Mutex::new(self.repositories),
            mode: self.mode,
            transitive: TransitiveResolver::new(self.dependency_graph),
            host,
            loaders: LoaderRegistry::new(factory),
        })
    }
}

/// Factory used when the host offers no isolation.
struct NoIsolation;

impl IsolatedUnitFactory for NoIsolation {
    fn create(&self, _loader_id: Option<&str>) -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        anyhow::bail!("isolated loading is not supported by this host")
    }
}

pub struct Engine {
    downloader: Downloader,
    repositories: Mutex<Vec<String>>,
    mode: ResolutionMode,
    relocations: RelocationCache,
    transitive: TransitiveResolver,
    host: Arc<dyn HostLoader>,
    loaders: LoaderRegistry,
}

impl Engine {
    pub fn builder(save_dir: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder::new(save_dir)
    }

    pub fn save_dir(&self) -> &Path {
        self.downloader.save_dir()
    }

    pub fn resolution_mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Appends a global repository; a trailing `/` is added if missing.
    pub fn add_repository(&self, url: &str) {
        let url = normalize_repository(url);
        let mut repos = self.lock_repositories();
        if !repos.contains(&url) {
            tracing::debug!("added repository {}", url);
            repos.push(url);
        }
    }

    pub fn add_maven_central(&self) {
        self.add_repository(MAVEN_CENTRAL);
    }

    /// Adds `~/.m2/repository/` when a home directory is known.
    pub fn add_maven_local(&self) -> bool {
        match repository::maven_local() {
            Some(url) => {
                self.add_repository(&url);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the global repository list.
    pub fn repositories(&self) -> Vec<String> {
        self.lock_repositories().clone()
    }

    /// Ordered candidate download URLs for `artifact`.
    pub fn resolve_candidates(&self, artifact: &Artifact) -> Vec<String> {
        repository::resolve_candidates(
            artifact,
            &self.repositories(),
            self.mode,
            self.downloader.fetcher(),
        )
    }

    /// Fetches `artifact` into the cache unless it is already there.
    pub fn acquire(&self, artifact: &Artifact) -> Result<PathBuf> {
        self.downloader
            .acquire(artifact, &self.repositories(), self.mode)
    }

    /// Relocates `input` into `save_dir/relocated_path` unless already done.
    pub fn relocate(
        &self,
        input: &Path,
        relocated_path: &str,
        rules: &[Relocation],
    ) -> Result<PathBuf> {
        self.relocations.relocate(input, relocated_path, rules)
    }

    pub fn find_transitive(&self, artifact: &Artifact) -> Result<Vec<Artifact>> {
        self.transitive
            .find_transitive(artifact, &self.repositories(), self.mode)
    }

    /// Runs the whole pipeline for `artifact` and returns the path that was
    /// handed to the loader.
    pub fn load(&self, artifact: &Artifact) -> Result<PathBuf> {
        let mut file = self.acquire(artifact)?;

        if artifact.resolve_transitive() {
            for child in self.find_transitive(artifact)? {
                self.load(&child)?;
            }
        }

        if let Some(relocated) = artifact.relocated_path() {
            file = self.relocate(&file, relocated, artifact.relocations())?;
        }

        let load_err = |source: anyhow::Error| DepotError::Load {
            artifact: artifact.to_string(),
            source,
        };
        if artifact.is_isolated_load() {
            let unit = self.loaders.resolve(artifact.loader_id()).map_err(load_err)?;
            unit.add_path(&file).map_err(load_err)?;
            tracing::info!(
                "loaded library {} into isolated unit {}",
                file.display(),
                artifact.loader_id().unwrap_or("<global>")
            );
        } else {
            self.host.add_to_classpath(&file).map_err(load_err)?;
            tracing::info!("loaded library {}", file.display());
        }
        Ok(file)
    }

    /// Loads each artifact in order, stopping at the first failure.
    pub fn load_all(&self, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
        artifacts.iter().map(|a| self.load(a)).collect()
    }

    /// Adds the manifest's repositories and loads its libraries.
    pub fn configure(&self, manifest: &Manifest) -> Result<Vec<PathBuf>> {
        for repo in manifest.repositories() {
            self.add_repository(repo);
        }
        let artifacts = manifest.artifacts()?;
        self.load_all(&artifacts)
    }

    /// The shared isolated unit, created on first use.
    pub fn global_isolated_unit(&self) -> Result<Arc<dyn IsolatedUnit>> {
        self.loaders.global().map_err(|source| DepotError::Load {
            artifact: "<global isolated unit>".to_string(),
            source,
        })
    }

    /// The isolated unit registered under `id`, if any artifact created it.
    pub fn isolated_unit(&self, id: &str) -> Option<Arc<dyn IsolatedUnit>> {
        self.loaders.get(id)
    }

    /// Ids of every isolated unit created so far.
    pub fn isolated_unit_ids(&self) -> Vec<String> {
        self.loaders.ids()
    }

    fn lock_repositories(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.repositories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
