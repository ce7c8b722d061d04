//! Snapshot tests for deterministic output.

mod checklist_output;
mod error_output;
