#![allow(dead_code)]

pub mod repo_server;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use depot_core::loader::{ClassHandle, HostLoader, IsolatedUnit, IsolatedUnitFactory};
use depot_core::{Engine, EngineBuilder};

/// Host loader that records every file it is given.
#[derive(Default)]
pub struct RecordingHost {
    pub files: Mutex<Vec<PathBuf>>,
}

impl HostLoader for RecordingHost {
    fn add_to_classpath(&self, file: &Path) -> anyhow::Result<()> {
        self.files.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }
}

/// Isolated unit that records its paths and the id it was created for.
pub struct RecordingUnit {
    pub id: Option<String>,
    pub files: Mutex<Vec<PathBuf>>,
}

impl IsolatedUnit for RecordingUnit {
    fn add_path(&self, file: &Path) -> anyhow::Result<()> {
        self.files.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }

    fn load_class(&self, name: &str) -> anyhow::Result<ClassHandle> {
        Ok(Arc::new(name.to_string()))
    }
}

pub fn unit_factory() -> Arc<dyn IsolatedUnitFactory> {
    let factory = |id: Option<&str>| -> anyhow::Result<Arc<dyn IsolatedUnit>> {
        Ok(Arc::new(RecordingUnit {
            id: id.map(str::to_string),
            files: Mutex::new(Vec::new()),
        }))
    };
    Arc::new(factory)
}

/// Engine builder over `save_dir` with a recording host and unit factory.
pub fn engine_builder(save_dir: &Path, host: &Arc<RecordingHost>) -> EngineBuilder {
    Engine::builder(save_dir)
        .host_loader(host.clone())
        .isolated_unit_factory(unit_factory())
}

/// `g/a/v/a-v.jar` for `g:a:v`.
pub fn jar_path(group: &str, artifact: &str, version: &str) -> String {
    format!(
        "{}/{}/{}/{}-{}.jar",
        group.replace('.', "/"),
        artifact,
        version,
        artifact,
        version
    )
}
