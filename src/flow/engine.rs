//! The test-flow engine: session lifecycle, result store and cursor over a
//! step catalog.
//!
//! Every operation returns a `Result`. Refused calls (no session, terminal
//! state) are errors, and clamped navigation is reported as
//! [`Navigation::AtBoundary`] rather than silently ignored.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FlowError, Result};
use crate::flow::catalog::{StepCatalog, StepDefinition};
use crate::flow::clock::{Clock, SystemClock};
use crate::flow::cursor::{Cursor, Navigation};
use crate::flow::events::{FlowEvent, FlowObserver};
use crate::flow::results::{RecordOutcome, ResultData, TestResult};
use crate::flow::session::{InstallationDetails, SessionStatus, TestSession, Technician, Transition};

/// Serializable snapshot of an engine, used for persistence between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub catalog: StepCatalog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<TestSession>,
    #[serde(default)]
    pub current_step_index: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Reject results for step ids that are not in the catalog.
    pub strict_step_ids: bool,
}

pub struct TestFlowEngine {
    catalog: StepCatalog,
    session: Option<TestSession>,
    cursor: Cursor,
    clock: Box<dyn Clock>,
    observers: Vec<Box<dyn FlowObserver>>,
    options: EngineOptions,
}

impl std::fmt::Debug for TestFlowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestFlowEngine")
            .field("catalog", &self.catalog.id())
            .field("session", &self.session.as_ref().map(|s| &s.id))
            .field("cursor", &self.cursor)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl TestFlowEngine {
    #[must_use]
    pub fn new(catalog: StepCatalog) -> Self {
        let cursor = Cursor::new(catalog.len());
        Self {
            catalog,
            session: None,
            cursor,
            clock: Box::new(SystemClock),
            observers: Vec::new(),
            options: EngineOptions::default(),
        }
    }

    /// Rebuild an engine from a saved snapshot.
    pub fn from_state(state: FlowState) -> Result<Self> {
        let FlowState {
            catalog,
            session,
            current_step_index,
        } = state;
        if current_step_index >= catalog.len() {
            return Err(FlowError::InvalidCatalog(format!(
                "saved step index {current_step_index} is past the end of catalog '{}'",
                catalog.id()
            )));
        }
        if let Some(session) = &session {
            if session.flow_id != catalog.id() {
                return Err(FlowError::InvalidCatalog(format!(
                    "saved session uses flow '{}' but catalog is '{}'",
                    session.flow_id,
                    catalog.id()
                )));
            }
            if session.current_step_index != current_step_index {
                return Err(FlowError::InvalidCatalog(format!(
                    "saved session is at step {} but the cursor is at step {current_step_index}",
                    session.current_step_index
                )));
            }
        }
        let mut engine = Self::new(catalog);
        engine.cursor = Cursor::at(current_step_index, engine.catalog.len());
        engine.session = session;
        Ok(engine)
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl FlowObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: impl FlowObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn snapshot(&self) -> FlowState {
        FlowState {
            catalog: self.catalog.clone(),
            session: self.session.clone(),
            current_step_index: self.cursor.index(),
        }
    }

    fn emit(&self, event: &FlowEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Start a new session. A completed session is replaced; an open one is
    /// an error.
    pub fn start_session(
        &mut self,
        installation_details: InstallationDetails,
        technician: Technician,
    ) -> Result<&TestSession> {
        if let Some(existing) = self.session.as_ref().filter(|s| s.is_open()) {
            return Err(FlowError::SessionAlreadyActive {
                session_id: existing.id.clone(),
            });
        }

        let session = TestSession::begin(
            self.catalog.id(),
            installation_details,
            technician,
            self.clock.now(),
        );
        self.cursor.reset();
        info!(session_id = %session.id, flow = %session.flow_id, "test session started");
        self.emit(&FlowEvent::SessionStarted {
            session_id: session.id.clone(),
            flow_id: session.flow_id.clone(),
        });
        let session: &TestSession = self.session.insert(session);
        Ok(session)
    }

    pub fn pause_session(&mut self) -> Result<Transition> {
        let session = self.session.as_mut().ok_or(FlowError::NoActiveSession)?;
        let transition = session.pause()?;
        let session_id = session.id.clone();
        debug!(%session_id, ?transition, "pause");
        if transition == Transition::Applied {
            self.emit(&FlowEvent::SessionPaused { session_id });
        }
        Ok(transition)
    }

    pub fn resume_session(&mut self) -> Result<Transition> {
        let session = self.session.as_mut().ok_or(FlowError::NoActiveSession)?;
        let transition = session.resume()?;
        let session_id = session.id.clone();
        debug!(%session_id, ?transition, "resume");
        if transition == Transition::Applied {
            self.emit(&FlowEvent::SessionResumed { session_id });
        }
        Ok(transition)
    }

    /// Finalize the session and return the snapshot for the caller to keep.
    pub fn complete_session(&mut self) -> Result<TestSession> {
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(FlowError::NoActiveSession)?;
        session.complete(now)?;
        let snapshot = session.clone();
        info!(
            session_id = %snapshot.id,
            results = snapshot.results.len(),
            "test session completed"
        );
        self.emit(&FlowEvent::SessionCompleted {
            session_id: snapshot.id.clone(),
            results: snapshot.results.len(),
        });
        Ok(snapshot)
    }

    /// Discard an open session without completing it.
    pub fn abandon_session(&mut self) -> Result<TestSession> {
        match self.session.take() {
            Some(session) if session.is_open() => {
                self.cursor.reset();
                warn!(session_id = %session.id, "test session abandoned");
                self.emit(&FlowEvent::SessionAbandoned {
                    session_id: session.id.clone(),
                });
                Ok(session)
            }
            Some(session) => {
                let from = session.status;
                self.session = Some(session);
                Err(FlowError::InvalidTransition {
                    from,
                    to: SessionStatus::NotStarted,
                })
            }
            None => Err(FlowError::NoActiveSession),
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Record (or overwrite) the result for a step.
    pub fn record_result(
        &mut self,
        step_id: impl Into<String>,
        data: ResultData,
    ) -> Result<RecordOutcome> {
        let step_id = step_id.into();
        let now = self.clock.now();
        let session = self.session.as_mut().ok_or(FlowError::NoActiveSession)?;
        if session.status != SessionStatus::InProgress {
            return Err(FlowError::SessionNotInProgress {
                status: session.status,
            });
        }
        if self.options.strict_step_ids && !self.catalog.contains(&step_id) {
            warn!(%step_id, flow = %self.catalog.id(), "rejected result for unknown step");
            return Err(FlowError::UnknownStep(step_id));
        }

        let outcome = session.results.upsert(TestResult {
            step_id: step_id.clone(),
            timestamp: now,
            data,
        });
        let session_id = session.id.clone();
        debug!(%session_id, %step_id, ?outcome, "result recorded");
        self.emit(&FlowEvent::ResultRecorded {
            session_id,
            step_id,
            replaced: outcome == RecordOutcome::Replaced,
        });
        Ok(outcome)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn next_step(&mut self) -> Result<Navigation> {
        self.navigate(Cursor::next)
    }

    pub fn previous_step(&mut self) -> Result<Navigation> {
        self.navigate(Cursor::previous)
    }

    /// Move the cursor to the step with the given id.
    pub fn go_to_step(&mut self, step_id: &str) -> Result<Navigation> {
        let index = self
            .catalog
            .position(step_id)
            .ok_or_else(|| FlowError::UnknownStep(step_id.to_string()))?;
        self.navigate(|cursor| cursor.jump(index))
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Cursor) -> Navigation) -> Result<Navigation> {
        if let Some(session) = self.session.as_ref().filter(|s| !s.is_open()) {
            return Err(FlowError::SessionNotInProgress {
                status: session.status,
            });
        }

        let navigation = step(&mut self.cursor);
        if let Some(session) = self.session.as_mut() {
            session.current_step_index = self.cursor.index();
        }
        match navigation {
            Navigation::Moved { from, to } => {
                debug!(from, to, "step changed");
                self.emit(&FlowEvent::StepChanged { from, to });
            }
            Navigation::AtBoundary { index } => {
                debug!(index, "navigation clamped at boundary");
            }
            Navigation::Unchanged { index } => {
                debug!(index, "already on requested step");
            }
        }
        Ok(navigation)
    }

    // =========================================================================
    // Derived queries
    // =========================================================================

    #[must_use]
    pub const fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map_or(SessionStatus::NotStarted, |s| s.status)
    }

    #[must_use]
    pub const fn current_step_index(&self) -> usize {
        self.cursor.index()
    }

    #[must_use]
    pub fn current_step(&self) -> &StepDefinition {
        // The cursor is clamped to the catalog, which is never empty.
        &self.catalog.steps()[self.cursor.index()]
    }

    #[must_use]
    pub fn current_step_result(&self) -> Option<&TestResult> {
        let step_id = &self.current_step().id;
        self.session.as_ref()?.results.get(step_id)
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.cursor.progress()
    }

    #[must_use]
    pub const fn is_first_step(&self) -> bool {
        self.cursor.is_first()
    }

    #[must_use]
    pub const fn is_last_step(&self) -> bool {
        self.cursor.is_last()
    }

    /// Catalog steps that already have a result.
    #[must_use]
    pub fn completed_steps(&self) -> Vec<&StepDefinition> {
        self.partition_steps(true)
    }

    /// Catalog steps still waiting for a result.
    #[must_use]
    pub fn outstanding_steps(&self) -> Vec<&StepDefinition> {
        self.partition_steps(false)
    }

    fn partition_steps(&self, recorded: bool) -> Vec<&StepDefinition> {
        self.catalog
            .steps()
            .iter()
            .filter(|step| {
                self.session
                    .as_ref()
                    .is_some_and(|s| s.results.contains(&step.id))
                    == recorded
            })
            .collect()
    }
}
