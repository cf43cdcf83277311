//! Persistent store adapter: one JSON file holding the whole aggregate.
//!
//! `load` fails soft — a missing, empty, or unparseable file yields `None`
//! and a log line, never an error. `save` rewrites the entire aggregate.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{state::AppState, Result};

#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved aggregate, if any. Parse failures are swallowed so a
    /// corrupt state file degrades to a fresh start instead of a crash.
    pub fn load(&self) -> Option<AppState> {
        if !self.path.exists() {
            return None;
        }
        let txt = match std::fs::read_to_string(&self.path) {
            Ok(txt) => txt,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read state file");
                return None;
            }
        };
        if txt.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<AppState>(&txt) {
            Ok(mut st) => {
                st.repair_active();
                Some(st)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse state file");
                None
            }
        }
    }

    /// Serialize the whole aggregate. Called after every mutation.
    pub fn save(&self, state: &AppState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let txt = serde_json::to_string(state)?;
        std::fs::write(&self.path, txt)?;
        Ok(())
    }
}
