//! Lifecycle events and the observers that receive them.
//!
//! The engine emits events; presentation layers decide how to notify.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum FlowEvent {
    SessionStarted { session_id: String, flow_id: String },
    SessionPaused { session_id: String },
    SessionResumed { session_id: String },
    ResultRecorded {
        session_id: String,
        step_id: String,
        replaced: bool,
    },
    StepChanged { from: usize, to: usize },
    SessionCompleted { session_id: String, results: usize },
    SessionAbandoned { session_id: String },
}

/// Short human-readable message for a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl FlowEvent {
    /// Notification text, or `None` for events that are not announced.
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        let (title, description) = match self {
            Self::SessionStarted { flow_id, .. } => (
                "Test Session Started",
                format!("Working through the {flow_id} flow"),
            ),
            Self::SessionPaused { .. } => (
                "Test Session Paused",
                "Progress is kept; resume when ready".to_string(),
            ),
            Self::SessionResumed { .. } => (
                "Test Session Resumed",
                "Continuing from the current step".to_string(),
            ),
            Self::ResultRecorded {
                step_id, replaced, ..
            } => (
                "Result Recorded",
                if *replaced {
                    format!("Updated result for {step_id}")
                } else {
                    format!("Saved result for {step_id}")
                },
            ),
            Self::SessionCompleted { results, .. } => (
                "Test Session Completed",
                format!("{results} result(s) recorded"),
            ),
            Self::SessionAbandoned { .. } => (
                "Test Session Abandoned",
                "Session discarded without completion".to_string(),
            ),
            Self::StepChanged { .. } => return None,
        };
        Some(Notification {
            title: title.to_string(),
            description,
        })
    }
}

/// Receives every event the engine emits.
pub trait FlowObserver: Send + Sync {
    fn on_event(&self, event: &FlowEvent);
}

impl<F> FlowObserver for F
where
    F: Fn(&FlowEvent) + Send + Sync,
{
    fn on_event(&self, event: &FlowEvent) {
        self(event);
    }
}

/// Logs notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FlowObserver for TracingObserver {
    fn on_event(&self, event: &FlowEvent) {
        if let Some(notification) = event.notification() {
            info!(title = %notification.title, "{}", notification.description);
        }
    }
}

/// Collects events; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<FlowEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .lock()
            .iter()
            .filter_map(FlowEvent::notification)
            .collect()
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<FlowEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl FlowObserver for EventLog {
    fn on_event(&self, event: &FlowEvent) {
        self.events.lock().push(event.clone());
    }
}
