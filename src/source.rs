//! Where topology snapshots come from, and what happens when they don't.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Result, TopologyError};
use crate::topology::{SyntheticOptions, TopologySnapshot, parse_topology, synthetic_topology};

/// Supplier of live topology snapshots.
pub trait TopologySource {
    fn fetch(&self) -> Result<TopologySnapshot>;

    /// Short human-readable origin, used in log lines.
    fn describe(&self) -> String;
}

/// Reads the backend's topology document from a file, or from stdin for `-`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> std::io::Result<String> {
        if self.path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        std::fs::read_to_string(&self.path)
    }
}

impl TopologySource for FileSource {
    fn fetch(&self) -> Result<TopologySnapshot> {
        let contents = self.read().map_err(|source| TopologyError::Io {
            path: self.path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Err(TopologyError::Upstream(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        parse_topology(&contents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Live,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: TopologySnapshot,
    pub origin: SnapshotOrigin,
}

/// Fetches from `source` and substitutes the synthetic snapshot on any
/// failure, or when there is no source at all. Never fails; the two kinds of
/// data are never merged.
pub fn load_or_synthetic(
    source: Option<&dyn TopologySource>,
    fallback: &SyntheticOptions,
) -> LoadedSnapshot {
    if let Some(source) = source {
        match source.fetch() {
            Ok(snapshot) => {
                log::info!(
                    "loaded {} topology with {} nodes from {}",
                    snapshot.kind.as_str(),
                    snapshot.nodes.len(),
                    source.describe()
                );
                return LoadedSnapshot {
                    snapshot,
                    origin: SnapshotOrigin::Live,
                };
            }
            Err(err) => {
                log::warn!("{err}; using synthetic topology");
            }
        }
    }
    LoadedSnapshot {
        snapshot: synthetic_topology(fallback),
        origin: SnapshotOrigin::Synthetic,
    }
}
