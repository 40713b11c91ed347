pub mod config;
pub mod logging;

pub mod artifact;
pub mod checksum;
pub mod download;
pub mod engine;
pub mod error;
pub mod external;
pub mod http;
pub mod lazy;
pub mod loader;
pub mod manifest;
pub mod relocate;
pub mod repository;
pub mod storage;
pub mod transitive;

pub use artifact::{Artifact, ArtifactBuilder, ExcludedCoordinate, Relocation};
pub use engine::{Engine, EngineBuilder};
pub use error::{DepotError, Result};
