//! Inspection test-flow engine.
//!
//! A session walks an ordered [`StepCatalog`], recording one result per step,
//! with a clamped cursor and a `not-started → in-progress ⇄ paused →
//! completed` lifecycle.

pub mod catalog;
pub mod clock;
pub mod cursor;
pub mod engine;
pub mod events;
pub mod results;
pub mod session;

pub use catalog::{ExpectedReading, StepCatalog, StepDefinition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cursor::{Cursor, Navigation};
pub use engine::{EngineOptions, FlowState, TestFlowEngine};
pub use events::{EventLog, FlowEvent, FlowObserver, Notification, TracingObserver};
pub use results::{Reading, RecordOutcome, ResultData, ResultStore, TestOutcome, TestResult};
pub use session::{InstallationDetails, SessionStatus, Technician, TestSession, Transition};
