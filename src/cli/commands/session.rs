//! testflow session - Run an inspection test session
//!
//! Each invocation loads the saved engine state, applies one operation and
//! writes the state back. Completing a session moves it to the archive.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, emit_notice, robot_ok};
use crate::error::Result;
use crate::flow::{
    EventLog, InstallationDetails, Navigation, Notification, RecordOutcome, ResultData,
    SessionStatus, StepCatalog, Technician, TestFlowEngine, TestOutcome, TestResult, TestSession,
    Transition,
};
use crate::storage::SessionSummary;

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Start a new session
    Start(StartArgs),
    /// Record the result for a step (defaults to the current step)
    Record(RecordArgs),
    /// Move to the next step
    Next,
    /// Move to the previous step
    Prev,
    /// Jump to a step by id
    Goto(GotoArgs),
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Complete the session and archive it
    Complete,
    /// Discard the open session
    Abandon,
    /// Show the current session
    Status,
    /// List archived sessions
    History(HistoryArgs),
    /// Show an archived or open session by id
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Built-in catalog id or catalog file (default: flow.default_catalog)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Installation address
    #[arg(long)]
    pub address: Option<String>,

    /// Client name
    #[arg(long)]
    pub client: Option<String>,

    /// Installation type, e.g. domestic or commercial
    #[arg(long)]
    pub installation_type: Option<String>,

    /// Free-text description of the installation
    #[arg(long)]
    pub description: Option<String>,

    /// Technician name
    #[arg(long)]
    pub technician: Option<String>,

    /// Technician registration number
    #[arg(long)]
    pub registration: Option<String>,

    /// Technician company
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Step id (default: current step)
    pub step_id: Option<String>,

    /// Outcome: pass, fail, na, limitation (default: assessed from --value)
    #[arg(long)]
    pub outcome: Option<TestOutcome>,

    /// Measured value
    #[arg(long)]
    pub value: Option<f64>,

    /// Unit of the measured value (default: the step's expected unit)
    #[arg(long, requires = "value")]
    pub unit: Option<String>,

    /// Notes for the report
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct GotoArgs {
    pub step_id: String,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of sessions to list
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub session_id: String,
}

#[derive(Serialize)]
struct StepView<'a> {
    index: usize,
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a TestResult>,
}

#[derive(Serialize)]
struct SessionReport<'a> {
    action: &'static str,
    status: SessionStatus,
    flow_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    current_step: StepView<'a>,
    total_steps: usize,
    recorded: usize,
    progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    navigation: Option<Navigation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<RecordOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<Transition>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
struct Effect {
    navigation: Option<Navigation>,
    record: Option<RecordOutcome>,
    transition: Option<Transition>,
}

#[derive(Serialize)]
struct ClosedReport {
    action: &'static str,
    session: TestSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived_to: Option<PathBuf>,
    notifications: Vec<Notification>,
}

pub fn run(ctx: &AppContext, args: &SessionArgs) -> Result<()> {
    let events = EventLog::new();
    match &args.command {
        SessionCommand::Start(start_args) => start(ctx, &events, start_args),
        SessionCommand::Record(record_args) => record(ctx, &events, record_args),
        SessionCommand::Next => step(ctx, &events, "next", |engine| {
            Ok(Effect {
                navigation: Some(engine.next_step()?),
                ..Effect::default()
            })
        }),
        SessionCommand::Prev => step(ctx, &events, "prev", |engine| {
            Ok(Effect {
                navigation: Some(engine.previous_step()?),
                ..Effect::default()
            })
        }),
        SessionCommand::Goto(goto_args) => step(ctx, &events, "goto", |engine| {
            Ok(Effect {
                navigation: Some(engine.go_to_step(&goto_args.step_id)?),
                ..Effect::default()
            })
        }),
        SessionCommand::Pause => step(ctx, &events, "pause", |engine| {
            Ok(Effect {
                transition: Some(engine.pause_session()?),
                ..Effect::default()
            })
        }),
        SessionCommand::Resume => step(ctx, &events, "resume", |engine| {
            Ok(Effect {
                transition: Some(engine.resume_session()?),
                ..Effect::default()
            })
        }),
        SessionCommand::Complete => complete(ctx, &events),
        SessionCommand::Abandon => abandon(ctx, &events),
        SessionCommand::Status => {
            let engine = ctx.load_engine(&events)?;
            emit_report(ctx, &engine, "status", Effect::default(), &events)
        }
        SessionCommand::History(history_args) => history(ctx, history_args),
        SessionCommand::Show(show_args) => show(ctx, &events, show_args),
    }
}

fn start(ctx: &AppContext, events: &EventLog, args: &StartArgs) -> Result<()> {
    let mut engine = ctx.load_engine(events)?;
    if engine.session().is_none_or(|session| !session.is_open()) {
        let name = args
            .catalog
            .as_deref()
            .unwrap_or(&ctx.config.flow.default_catalog);
        engine = ctx.new_engine(StepCatalog::resolve(name)?, events);
    }

    let details = InstallationDetails {
        address: args.address.clone(),
        client_name: args.client.clone(),
        installation_type: args.installation_type.clone(),
        description: args.description.clone(),
        ..InstallationDetails::default()
    };
    let technician = Technician {
        name: args.technician.clone().unwrap_or_default(),
        registration_number: args.registration.clone(),
        company: args.company.clone(),
    };
    engine.start_session(details, technician)?;
    ctx.store.save_state(&engine.snapshot())?;
    emit_report(ctx, &engine, "start", Effect::default(), events)
}

fn record(ctx: &AppContext, events: &EventLog, args: &RecordArgs) -> Result<()> {
    let mut engine = ctx.load_engine(events)?;
    let step_id = args
        .step_id
        .clone()
        .unwrap_or_else(|| engine.current_step().id.clone());
    let step = engine.catalog().step(&step_id);

    let outcome = args.outcome.unwrap_or_else(|| {
        args.value
            .and_then(|value| step.and_then(|s| s.assess(value)))
            .unwrap_or(TestOutcome::Pass)
    });
    let mut data = ResultData::new(outcome);
    if let Some(value) = args.value {
        let unit = args
            .unit
            .clone()
            .or_else(|| step.and_then(|s| s.expected.as_ref()).map(|e| e.unit.clone()))
            .unwrap_or_default();
        data = data.with_reading(value, unit);
    }
    if let Some(notes) = &args.notes {
        data = data.with_notes(notes.clone());
    }

    let outcome = engine.record_result(step_id, data)?;
    ctx.store.save_state(&engine.snapshot())?;
    emit_report(
        ctx,
        &engine,
        "record",
        Effect {
            record: Some(outcome),
            ..Effect::default()
        },
        events,
    )
}

fn step(
    ctx: &AppContext,
    events: &EventLog,
    action: &'static str,
    op: impl FnOnce(&mut TestFlowEngine) -> Result<Effect>,
) -> Result<()> {
    let mut engine = ctx.load_engine(events)?;
    let effect = op(&mut engine)?;
    ctx.store.save_state(&engine.snapshot())?;
    emit_report(ctx, &engine, action, effect, events)
}

fn complete(ctx: &AppContext, events: &EventLog) -> Result<()> {
    let mut engine = ctx.load_engine(events)?;
    let session = engine.complete_session()?;
    let path = ctx.store.archive(&session)?;
    ctx.store.clear_state()?;
    emit_closed(ctx, "complete", session, Some(path), events)
}

fn abandon(ctx: &AppContext, events: &EventLog) -> Result<()> {
    let mut engine = ctx.load_engine(events)?;
    let session = engine.abandon_session()?;
    ctx.store.clear_state()?;
    emit_closed(ctx, "abandon", session, None, events)
}

fn history(ctx: &AppContext, args: &HistoryArgs) -> Result<()> {
    let mut sessions = ctx.store.list_archived()?;
    sessions.truncate(args.limit);

    if ctx.robot_mode {
        return emit_json(&robot_ok(&sessions));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Session history");
    if sessions.is_empty() {
        layout.push_line("No archived sessions");
    }
    for summary in &sessions {
        layout.bullet(&summary_line(summary));
    }
    emit_human(layout);
    Ok(())
}

fn show(ctx: &AppContext, events: &EventLog, args: &ShowArgs) -> Result<()> {
    let open = ctx
        .store
        .load_state()?
        .and_then(|state| state.session)
        .filter(|session| session.id == args.session_id);
    let session = match open {
        Some(session) => session,
        None => ctx.store.load_archived(&args.session_id)?,
    };
    emit_closed(ctx, "show", session, None, events)
}

fn summary_line(summary: &SessionSummary) -> String {
    let address = summary.address.as_deref().unwrap_or("no address");
    format!(
        "{} {} {} [{}] {} result(s) - {address}",
        summary.start_time.format("%Y-%m-%d %H:%M"),
        summary.id,
        summary.flow_id,
        summary.status,
        summary.results,
    )
}

fn announce(ctx: &AppContext, notifications: &[Notification]) {
    if ctx.robot_mode {
        return;
    }
    for notification in notifications {
        emit_notice(ctx.output_format, &notification.title, &notification.description);
    }
}

fn emit_report(
    ctx: &AppContext,
    engine: &TestFlowEngine,
    action: &'static str,
    effect: Effect,
    events: &EventLog,
) -> Result<()> {
    let notifications = events.notifications();
    announce(ctx, &notifications);

    let current = engine.current_step();
    let session = engine.session();
    let report = SessionReport {
        action,
        status: engine.status(),
        flow_id: engine.catalog().id(),
        session_id: session.map(|s| s.id.as_str()),
        current_step: StepView {
            index: engine.current_step_index(),
            id: &current.id,
            title: &current.title,
            result: engine.current_step_result(),
        },
        total_steps: engine.catalog().len(),
        recorded: session.map_or(0, |s| s.results.len()),
        progress: engine.progress(),
        navigation: effect.navigation,
        record: effect.record,
        transition: effect.transition,
        notifications,
    };

    if ctx.robot_mode {
        return emit_json(&robot_ok(&report));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title(&format!("{} session", engine.catalog().name()));
    if let Some(id) = report.session_id {
        layout.kv("Session", id);
    }
    layout.kv("Status", report.status.as_str());
    layout.kv(
        "Step",
        &format!(
            "{}/{} {} [{}]",
            report.current_step.index + 1,
            report.total_steps,
            report.current_step.title,
            report.current_step.id
        ),
    );
    if let Some(result) = report.current_step.result {
        layout.kv("Result", &result_summary(result));
    }
    layout.kv(
        "Recorded",
        &format!("{}/{}", report.recorded, report.total_steps),
    );
    layout.kv("Progress", &format!("{:.0}%", report.progress));
    match report.navigation {
        Some(Navigation::AtBoundary { .. }) => {
            layout.push_line("Already at the end of the flow in that direction");
        }
        Some(Navigation::Unchanged { .. }) => {
            layout.push_line("Already on that step");
        }
        Some(Navigation::Moved { .. }) | None => {}
    }
    if report.transition == Some(Transition::Unchanged) {
        layout.push_line(format!("Session was already {}", report.status));
    }
    if action == "status" && session.is_some() {
        let outstanding = engine.outstanding_steps();
        if !outstanding.is_empty() {
            layout.blank().section("Outstanding");
            for step in outstanding {
                layout.bullet(&format!("{} [{}]", step.title, step.id));
            }
        }
    }
    emit_human(layout);
    Ok(())
}

fn result_summary(result: &TestResult) -> String {
    let mut text = result.data.outcome.to_string();
    if let Some(reading) = &result.data.reading {
        text.push_str(&format!(" ({} {})", reading.value, reading.unit));
    }
    if let Some(notes) = &result.data.notes {
        text.push_str(&format!(" - {notes}"));
    }
    text
}

fn emit_closed(
    ctx: &AppContext,
    action: &'static str,
    session: TestSession,
    archived_to: Option<PathBuf>,
    events: &EventLog,
) -> Result<()> {
    let notifications = events.notifications();
    announce(ctx, &notifications);

    if ctx.robot_mode {
        return emit_json(&robot_ok(ClosedReport {
            action,
            session,
            archived_to,
            notifications,
        }));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title(&format!("Session {}", session.id));
    layout.kv("Flow", &session.flow_id);
    layout.kv("Status", session.status.as_str());
    if let Some(address) = &session.installation_details.address {
        layout.kv("Address", address);
    }
    if !session.technician.name.is_empty() {
        layout.kv("Technician", &session.technician.name);
    }
    layout.kv("Started", &session.start_time.to_rfc3339());
    if let Some(end) = session.end_time {
        layout.kv("Finished", &end.to_rfc3339());
    }
    layout.kv(
        "Outcomes",
        &format!(
            "{} pass, {} fail, {} n/a, {} limitation",
            session.results.count(TestOutcome::Pass),
            session.results.count(TestOutcome::Fail),
            session.results.count(TestOutcome::NotApplicable),
            session.results.count(TestOutcome::Limitation),
        ),
    );
    if !session.results.is_empty() {
        layout.blank().section("Results");
        for result in session.results.iter() {
            layout.bullet(&format!("{}: {}", result.step_id, result_summary(result)));
        }
    }
    if let Some(path) = archived_to {
        layout.blank().kv("Archived", &path.display().to_string());
    }
    emit_human(layout);
    Ok(())
}
