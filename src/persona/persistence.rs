//! Persistence port for the persona collection.
//!
//! The store never touches files directly; it goes through
//! [`PersonaPersistence`] so tests can substitute [`MemoryPersistence`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::types::Persona;

/// Whole-collection load/save plus the selected-persona handoff marker.
pub trait PersonaPersistence {
    /// Load the full collection. No stored value means an empty list.
    fn load(&self) -> Result<Vec<Persona>>;

    /// Overwrite the full collection.
    fn save(&self, personas: &[Persona]) -> Result<()>;

    fn load_selected(&self) -> Result<Option<String>>;

    /// Write the handoff marker; `None` removes it.
    fn save_selected(&self, id: Option<&str>) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────
// JSON file persistence
// ─────────────────────────────────────────────────────────────────

/// Stores the collection as one JSON array and the selection as a one-line
/// text file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    personas_path: PathBuf,
    selection_path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(personas_path: impl Into<PathBuf>, selection_path: impl Into<PathBuf>) -> Self {
        Self {
            personas_path: personas_path.into(),
            selection_path: selection_path.into(),
        }
    }

    pub fn personas_path(&self) -> &Path {
        &self.personas_path
    }
}

impl PersonaPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<Persona>> {
        if !self.personas_path.exists() {
            debug!(path = %self.personas_path.display(), "No persona file, starting empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.personas_path).map_err(|e| Error::IoRead {
            path: self.personas_path.clone(),
            source: e,
        })?;

        if content.trim().is_empty() {
            debug!(path = %self.personas_path.display(), "Persona file is empty, starting empty");
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            warn!(path = %self.personas_path.display(), error = %e, "Persona file is corrupt");
            Error::StorageCorrupt {
                path: self.personas_path.clone(),
                message: e.to_string(),
            }
        })
    }

    fn save(&self, personas: &[Persona]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(personas).map_err(|e| Error::StorageWrite {
            message: e.to_string(),
        })?;
        write_atomic(&self.personas_path, &bytes)?;
        debug!(path = %self.personas_path.display(), count = personas.len(), "Personas saved");
        Ok(())
    }

    fn load_selected(&self) -> Result<Option<String>> {
        if !self.selection_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.selection_path).map_err(|e| Error::IoRead {
            path: self.selection_path.clone(),
            source: e,
        })?;
        let id = content.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    fn save_selected(&self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) => write_atomic(&self.selection_path, id.as_bytes()),
            None if self.selection_path.exists() => {
                fs::remove_file(&self.selection_path).map_err(|e| Error::IoWrite {
                    path: self.selection_path.clone(),
                    source: e,
                })
            }
            None => Ok(()),
        }
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_write = |e: std::io::Error| Error::IoWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_write)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(io_write)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_write(e)
    })
}

// ─────────────────────────────────────────────────────────────────
// In-memory persistence
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    personas: Vec<Persona>,
    selected: Option<String>,
    fail_writes: bool,
    saves: usize,
}

/// Shared in-memory fake. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_personas(personas: Vec<Persona>) -> Self {
        let fake = Self::new();
        fake.state.write().personas = personas;
        fake
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.write().fail_writes = fail;
    }

    /// What a fresh load would return.
    pub fn snapshot(&self) -> Vec<Persona> {
        self.state.read().personas.clone()
    }

    /// Number of successful collection saves.
    pub fn save_count(&self) -> usize {
        self.state.read().saves
    }
}

impl PersonaPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Persona>> {
        Ok(self.state.read().personas.clone())
    }

    fn save(&self, personas: &[Persona]) -> Result<()> {
        let mut state = self.state.write();
        if state.fail_writes {
            return Err(Error::StorageWrite {
                message: "simulated write failure".to_string(),
            });
        }
        state.personas = personas.to_vec();
        state.saves += 1;
        Ok(())
    }

    fn load_selected(&self) -> Result<Option<String>> {
        Ok(self.state.read().selected.clone())
    }

    fn save_selected(&self, id: Option<&str>) -> Result<()> {
        let mut state = self.state.write();
        if state.fail_writes {
            return Err(Error::StorageWrite {
                message: "simulated write failure".to_string(),
            });
        }
        state.selected = id.map(str::to_string);
        Ok(())
    }
}
