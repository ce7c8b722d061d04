//! Per-step result storage.
//!
//! One entry per step id, last write wins. Replacing an entry keeps its
//! position so audit displays stay in first-recorded order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    Pass,
    Fail,
    NotApplicable,
    /// Step could not be completed fully; recorded as a limitation.
    Limitation,
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::NotApplicable => "not-applicable",
            Self::Limitation => "limitation",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for TestOutcome {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pass" | "ok" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            "na" | "n/a" | "not-applicable" => Ok(Self::NotApplicable),
            "lim" | "limitation" => Ok(Self::Limitation),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub unit: String,
}

/// What the technician recorded for a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub outcome: TestOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ResultData {
    #[must_use]
    pub const fn new(outcome: TestOutcome) -> Self {
        Self {
            outcome,
            reading: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_reading(mut self, value: f64, unit: impl Into<String>) -> Self {
        self.reading = Some(Reading {
            value,
            unit: unit.into(),
        });
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub step_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ResultData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    Inserted,
    Replaced,
}

/// Ordered results, unique by step id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultStore {
    entries: Vec<TestResult>,
}

impl ResultStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace the result for `result.step_id`.
    pub fn upsert(&mut self, result: TestResult) -> RecordOutcome {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.step_id == result.step_id)
        {
            Some(existing) => {
                *existing = result;
                RecordOutcome::Replaced
            }
            None => {
                self.entries.push(result);
                RecordOutcome::Inserted
            }
        }
    }

    #[must_use]
    pub fn get(&self, step_id: &str) -> Option<&TestResult> {
        self.entries.iter().find(|entry| entry.step_id == step_id)
    }

    #[must_use]
    pub fn contains(&self, step_id: &str) -> bool {
        self.get(step_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[TestResult] {
        &self.entries
    }

    /// Count of entries with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: TestOutcome) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.data.outcome == outcome)
            .count()
    }
}
