//! Scenario tests against the public `testflow` API.

mod checklist_scenarios;
mod flow_scenarios;
mod storage_scenarios;
