//! Test session aggregate and its lifecycle transitions.
//!
//! ```text
//! not-started -> in-progress <-> paused
//!                     |            |
//!                     +-> completed <+
//! ```
//!
//! `completed` is terminal. `end_time` is set exactly when the status is
//! `completed`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FlowError, Result};
use crate::flow::results::ResultStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a lifecycle call changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Applied,
    Unchanged,
}

/// Installation under test. Stored as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Technician {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub id: String,
    pub flow_id: String,
    pub installation_details: InstallationDetails,
    pub technician: Technician,
    pub results: ResultStore,
    pub current_step_index: usize,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

impl TestSession {
    pub(crate) fn begin(
        flow_id: &str,
        installation_details: InstallationDetails,
        technician: Technician,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            flow_id: flow_id.to_string(),
            installation_details,
            technician,
            results: ResultStore::new(),
            current_step_index: 0,
            start_time: now,
            end_time: None,
            status: SessionStatus::InProgress,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    pub(crate) fn pause(&mut self) -> Result<Transition> {
        match self.status {
            SessionStatus::InProgress => {
                self.status = SessionStatus::Paused;
                Ok(Transition::Applied)
            }
            SessionStatus::Paused => Ok(Transition::Unchanged),
            from => Err(FlowError::InvalidTransition {
                from,
                to: SessionStatus::Paused,
            }),
        }
    }

    pub(crate) fn resume(&mut self) -> Result<Transition> {
        match self.status {
            SessionStatus::Paused => {
                self.status = SessionStatus::InProgress;
                Ok(Transition::Applied)
            }
            SessionStatus::InProgress => Ok(Transition::Unchanged),
            from => Err(FlowError::InvalidTransition {
                from,
                to: SessionStatus::InProgress,
            }),
        }
    }

    pub(crate) fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            SessionStatus::InProgress | SessionStatus::Paused => {
                self.status = SessionStatus::Completed;
                self.end_time = Some(now);
                Ok(())
            }
            from => Err(FlowError::InvalidTransition {
                from,
                to: SessionStatus::Completed,
            }),
        }
    }

    /// Elapsed time from start to completion, or to `now` while open.
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> TestSession {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap();
        TestSession::begin(
            "eicr",
            InstallationDetails::default(),
            Technician {
                name: "A. Sparks".into(),
                ..Technician::default()
            },
            now,
        )
    }

    #[test]
    fn begins_in_progress_without_end_time() {
        let session = session();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.end_time.is_none());
        assert!(session.results.is_empty());
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut session = session();
        assert_eq!(session.pause().unwrap(), Transition::Applied);
        assert_eq!(session.pause().unwrap(), Transition::Unchanged);
        assert_eq!(session.resume().unwrap(), Transition::Applied);
        assert_eq!(session.resume().unwrap(), Transition::Unchanged);
    }

    #[test]
    fn completed_is_terminal() {
        let mut session = session();
        let end = session.start_time + chrono::Duration::hours(2);
        session.complete(end).unwrap();
        assert_eq!(session.end_time, Some(end));
        assert!(matches!(
            session.pause(),
            Err(FlowError::InvalidTransition {
                from: SessionStatus::Completed,
                to: SessionStatus::Paused
            })
        ));
        assert!(session.resume().is_err());
        assert!(session.complete(end).is_err());
        assert_eq!(session.duration(end), chrono::Duration::hours(2));
    }

    #[test]
    fn paused_session_can_complete() {
        let mut session = session();
        session.pause().unwrap();
        session.complete(session.start_time).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&SessionStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
    }
}
