//! The CLI's loading host.
//!
//! There is no program to inject code into, so loading means collecting
//! classpaths: one for the host and one per isolated unit. Commands print
//! them for a launcher to use.

use anyhow::{bail, Result};
use depot_core::config::{self, DepotConfig};
use depot_core::loader::{ClassHandle, HostLoader, IsolatedUnit, IsolatedUnitFactory};
use depot_core::{Engine, EngineBuilder};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct ClasspathHost {
    entries: Mutex<Vec<PathBuf>>,
}

impl ClasspathHost {
    pub fn entries(&self) -> Vec<PathBuf> {
        lock(&self.entries).clone()
    }
}

impl HostLoader for ClasspathHost {
    fn add_to_classpath(&self, file: &Path) -> Result<()> {
        let mut entries = lock(&self.entries);
        if !entries.iter().any(|e| e == file) {
            entries.push(file.to_path_buf());
        }
        Ok(())
    }
}

/// An isolated classpath.
#[derive(Debug)]
pub struct ClasspathUnit {
    id: Option<String>,
    entries: Mutex<Vec<PathBuf>>,
}

impl ClasspathUnit {
    fn new(id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("global")
    }

    pub fn entries(&self) -> Vec<PathBuf> {
        lock(&self.entries).clone()
    }
}

impl IsolatedUnit for ClasspathUnit {
    fn add_path(&self, file: &Path) -> Result<()> {
        let mut entries = lock(&self.entries);
        if !entries.iter().any(|e| e == file) {
            entries.push(file.to_path_buf());
        }
        Ok(())
    }

    /// Finds `name` as a `.class` file under a directory entry.
    fn load_class(&self, name: &str) -> Result<ClassHandle> {
        let relative = format!("{}.class", name.replace('.', "/"));
        for entry in lock(&self.entries).iter() {
            let candidate = entry.join(&relative);
            if entry.is_dir() && candidate.is_file() {
                return Ok(Arc::new(candidate));
            }
        }
        bail!("class {} not found in isolated unit {}", name, self.label())
    }
}

/// Creates [`ClasspathUnit`]s and keeps them for printing.
#[derive(Debug, Default)]
pub struct UnitRecorder {
    units: Mutex<Vec<Arc<ClasspathUnit>>>,
}

impl UnitRecorder {
    pub fn units(&self) -> Vec<Arc<ClasspathUnit>> {
        lock(&self.units).clone()
    }
}

impl IsolatedUnitFactory for UnitRecorder {
    fn create(&self, loader_id: Option<&str>) -> Result<Arc<dyn IsolatedUnit>> {
        let unit = Arc::new(ClasspathUnit::new(loader_id));
        lock(&self.units).push(Arc::clone(&unit));
        Ok(unit)
    }
}

/// Engine wired to a classpath host.
pub struct Session {
    pub engine: Engine,
    pub host: Arc<ClasspathHost>,
    pub units: Arc<UnitRecorder>,
}

impl Session {
    /// Engine from `config.toml`, with `save_dir` overriding the configured cache.
    pub fn open(save_dir: Option<PathBuf>) -> Result<Self> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        Self::with_config(&cfg, save_dir)
    }

    pub fn with_config(cfg: &DepotConfig, save_dir: Option<PathBuf>) -> Result<Self> {
        let host = Arc::new(ClasspathHost::default());
        let units = Arc::new(UnitRecorder::default());
        let mut builder: EngineBuilder = EngineBuilder::from_config(cfg)?
            .host_loader(host.clone())
            .isolated_unit_factory(units.clone());
        if let Some(dir) = save_dir {
            builder = builder.save_dir(dir);
        }
        Ok(Self {
            engine: builder.build()?,
            host,
            units,
        })
    }

    /// Prints the host classpath, then one line per isolated unit.
    pub fn print_classpaths(&self) -> Result<()> {
        let host = self.host.entries();
        if !host.is_empty() {
            println!("classpath: {}", join(&host)?);
        }
        for unit in self.units.units() {
            println!("isolated[{}]: {}", unit.label(), join(&unit.entries())?);
        }
        Ok(())
    }
}

fn join(entries: &[PathBuf]) -> Result<String> {
    let joined: OsString = std::env::join_paths(entries)?;
    Ok(joined.to_string_lossy().into_owned())
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
