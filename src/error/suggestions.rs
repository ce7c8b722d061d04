//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the step, catalog or session involved.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::UnknownStep => suggest_unknown_step(context),
        ErrorCode::CatalogNotFound => suggest_catalog_not_found(context),
        ErrorCode::SessionAlreadyActive => suggest_session_already_active(context),
        ErrorCode::SessionNotInProgress => suggest_session_not_in_progress(context),
        ErrorCode::OutOfRange => suggest_out_of_range(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_unknown_step(context: Option<&Value>) -> String {
    match context_str(context, "step_id") {
        Some(step_id) => format!(
            "Step '{step_id}' is not in the active catalog. Run `testflow session status` to see the current flow"
        ),
        None => ErrorCode::UnknownStep.suggestion().to_string(),
    }
}

fn suggest_catalog_not_found(context: Option<&Value>) -> String {
    match context_str(context, "catalog") {
        Some(name) => format!(
            "No catalog named '{name}'. Run `testflow catalog list`, or pass a path to a .yaml/.json catalog"
        ),
        None => ErrorCode::CatalogNotFound.suggestion().to_string(),
    }
}

fn suggest_session_already_active(context: Option<&Value>) -> String {
    match context_str(context, "session_id") {
        Some(id) => format!(
            "Session {id} is still open. Run `testflow session complete` or `testflow session abandon` first"
        ),
        None => ErrorCode::SessionAlreadyActive.suggestion().to_string(),
    }
}

fn suggest_session_not_in_progress(context: Option<&Value>) -> String {
    match context_str(context, "status") {
        Some("completed") => {
            "The session is completed. Start a new session to record further results".to_string()
        }
        Some("paused") => "The session is paused. Run `testflow session resume` first".to_string(),
        _ => ErrorCode::SessionNotInProgress.suggestion().to_string(),
    }
}

fn suggest_out_of_range(context: Option<&Value>) -> String {
    match context_str(context, "parameter") {
        Some(parameter) => format!(
            "The {parameter} value is outside the lookup table. Check the input or apply a manual factor"
        ),
        None => ErrorCode::OutOfRange.suggestion().to_string(),
    }
}
