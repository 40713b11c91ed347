//! Loading capabilities and the isolated-unit registry.
//!
//! How a file actually becomes loadable code is up to the host: the engine
//! only hands paths to a [`HostLoader`] or to an [`IsolatedUnit`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque handle for something an isolated unit loaded.
pub type ClassHandle = Arc<dyn Any + Send + Sync>;

/// Adds files to the host program's own code-search path.
pub trait HostLoader: Send + Sync {
    fn add_to_classpath(&self, file: &Path) -> anyhow::Result<()>;
}

/// A separately scoped code-search path.
pub trait IsolatedUnit: Send + Sync {
    fn add_path(&self, file: &Path) -> anyhow::Result<()>;

    fn load_class(&self, name: &str) -> anyhow::Result<ClassHandle>;
}

/// Creates isolated units. `None` asks for the shared global unit.
pub trait IsolatedUnitFactory: Send + Sync {
    fn create(&self, loader_id: Option<&str>) -> anyhow::Result<Arc<dyn IsolatedUnit>>;
}

impl<F> IsolatedUnitFactory for F
where
    F: Fn(Option<&str>) -> anyhow::Result<Arc<dyn IsolatedUnit>> + Send + Sync,
{
    fn create(&self, loader_id: Option<&str>) -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        self(loader_id)
    }
}

/// Isolated units by loader id, plus the global unit.
///
/// Units are created on first use and live as long as the registry.
pub struct LoaderRegistry {
    factory: Arc<dyn IsolatedUnitFactory>,
    units: Mutex<HashMap<String, Arc<dyn IsolatedUnit>>>,
    global: Mutex<Option<Arc<dyn IsolatedUnit>>>,
}

impl LoaderRegistry {
    pub fn new(factory: Arc<dyn IsolatedUnitFactory>) -> Self {
        Self {
            factory,
            units: Mutex::new(HashMap::new()),
            global: Mutex::new(None),
        }
    }

    /// The shared unit for artifacts without a loader id.
    pub fn global(&self) -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        let mut global = lock(&self.global);
        if let Some(unit) = global.as_ref() {
            return Ok(Arc::clone(unit));
        }
        let unit = self.factory.create(None)?;
        *global = Some(Arc::clone(&unit));
        tracing::debug!("created global isolated unit");
        Ok(unit)
    }

    /// The unit registered under `id`, created if missing.
    pub fn unit(&self, id: &str) -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        let mut units = lock(&self.units);
        if let Some(unit) = units.get(id) {
            return Ok(Arc::clone(unit));
        }
        let unit = self.factory.create(Some(id))?;
        units.insert(id.to_string(), Arc::clone(&unit));
        tracing::debug!("created isolated unit '{}'", id);
        Ok(unit)
    }

    /// The unit for an optional loader id.
    pub fn resolve(&self, loader_id: Option<&str>) -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        match loader_id {
            Some(id) => self.unit(id),
            None => self.global(),
        }
    }

    /// The unit registered under `id`, without creating one.
    pub fn get(&self, id: &str) -> Option<Arc<dyn IsolatedUnit>> {
        lock(&self.units).get(id).cloned()
    }

    /// Registered loader ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.units).keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("units", &self.ids())
            .field("global", &lock(&self.global).is_some())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
