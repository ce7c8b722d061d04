//! On-disk persistence for the CLI.
//!
//! Layout under the data root:
//!
//! ```text
//! <root>/state.json            engine snapshot for the open session
//! <root>/sessions/<id>.json    archived sessions
//! ```
//!
//! Every write goes to a temp file in the target directory and is renamed
//! over the destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{FlowError, Result};
use crate::flow::{FlowState, SessionStatus, TestSession};

const STATE_FILE: &str = "state.json";
const SESSIONS_DIR: &str = "sessions";

/// One line of `session history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub flow_id: String,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&TestSession> for SessionSummary {
    fn from(session: &TestSession) -> Self {
        Self {
            id: session.id.clone(),
            flow_id: session.flow_id.clone(),
            status: session.status,
            start_time: session.start_time,
            end_time: session.end_time,
            results: session.results.len(),
            address: session.installation_details.address.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join(SESSIONS_DIR)
    }

    fn archive_path(&self, session_id: &str) -> Result<PathBuf> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FlowError::NotFound(format!("session '{session_id}'")));
        }
        Ok(self.sessions_dir().join(format!("{session_id}.json")))
    }

    /// Saved engine snapshot, if any.
    pub fn load_state(&self) -> Result<Option<FlowState>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .map_err(|err| FlowError::Storage(format!("read {}: {err}", path.display())))?;
        let state: FlowState = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "loaded flow state");
        Ok(Some(state))
    }

    pub fn save_state(&self, state: &FlowState) -> Result<()> {
        let path = self.state_path();
        write_atomic(&path, &serde_json::to_string_pretty(state)?)?;
        debug!(path = %path.display(), "saved flow state");
        Ok(())
    }

    /// Remove the saved snapshot. Returns whether one existed.
    pub fn clear_state(&self) -> Result<bool> {
        let path = self.state_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FlowError::Storage(format!(
                "remove {}: {err}",
                path.display()
            ))),
        }
    }

    /// Write a session to the archive, replacing any earlier copy.
    pub fn archive(&self, session: &TestSession) -> Result<PathBuf> {
        let path = self.archive_path(&session.id)?;
        write_atomic(&path, &serde_json::to_string_pretty(session)?)?;
        debug!(session = %session.id, path = %path.display(), "archived session");
        Ok(path)
    }

    pub fn load_archived(&self, session_id: &str) -> Result<TestSession> {
        let path = self.archive_path(session_id)?;
        if !path.exists() {
            return Err(FlowError::NotFound(format!("session '{session_id}'")));
        }
        let contents = std::fs::read_to_string(&path)
            .map_err(|err| FlowError::Storage(format!("read {}: {err}", path.display())))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Archived sessions, newest first.
    pub fn list_archived(&self) -> Result<Vec<SessionSummary>> {
        let dir = self.sessions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir)
            .map_err(|err| FlowError::Storage(format!("read {}: {err}", dir.display())))?;

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<TestSession>(&contents) {
                Ok(session) => summaries.push(SessionSummary::from(&session)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable archive: {err}");
                }
            }
        }
        summaries.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

/// Write `contents` to `path` via a sibling temp file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .map_err(|err| FlowError::Storage(format!("create {}: {err}", parent.display())))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .map_err(|err| FlowError::Storage(format!("temp file in {}: {err}", parent.display())))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|err| FlowError::Storage(format!("write {}: {}", path.display(), err.error)))?;
    Ok(())
}
