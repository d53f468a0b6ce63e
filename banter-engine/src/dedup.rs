use banter_core::CoreError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Durable set of post ids that were already commented on.
///
/// The set only ever grows during a run (explicit `clear` aside). Records
/// are in-memory until `persist` runs; the controller persists at the end of
/// every run, including the cancellation path.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl DedupStore {
    /// Load the store from disk. A missing, unreadable, or corrupt file is
    /// never fatal: the run starts with an empty set and a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => {
                    info!("Loaded {} previously commented posts", ids.len());
                    ids.into_iter().collect()
                }
                Err(e) => {
                    warn!("Error parsing {}: {}, starting fresh", path.display(), e);
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                warn!("Error loading {}: {}, starting fresh", path.display(), e);
                HashSet::new()
            }
        };
        Self { path, seen }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Insert an id. Returns false when it was already present; repeated
    /// records of the same id are a no-op.
    pub fn record(&mut self, id: impl Into<String>) -> bool {
        self.seen.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the set to disk atomically: serialize into a sibling temp file,
    /// then rename over the target, so a crash mid-write never corrupts the
    /// previously durable state.
    pub fn persist(&self) -> Result<(), CoreError> {
        let mut ids: Vec<&String> = self.seen.iter().collect();
        ids.sort();
        let raw = serde_json::to_string(&ids)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, raw)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!("Persisted {} commented posts to {}", ids.len(), self.path.display());
        Ok(())
    }

    /// Drop all history, in memory and on disk.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.seen.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(CoreError::Io(e)),
        }
        info!("Cleared comment history at {}", self.path.display());
        Ok(())
    }
}
