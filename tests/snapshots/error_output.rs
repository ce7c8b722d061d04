use testflow::FlowError;
use testflow::error::StructuredError;
use testflow::flow::SessionStatus;

#[test]
fn paused_session_error() {
    let err = FlowError::SessionNotInProgress {
        status: SessionStatus::Paused,
    };
    insta::assert_json_snapshot!(StructuredError::from(&err), @r#"
    {
      "code": "SESSION_NOT_IN_PROGRESS",
      "numeric_code": 104,
      "message": "Test session is paused, not in progress",
      "suggestion": "The session is paused. Run `testflow session resume` first",
      "context": {
        "status": "paused"
      },
      "recoverable": true,
      "category": "session"
    }
    "#);
}

#[test]
fn no_session_error() {
    let err = FlowError::NoActiveSession;
    insta::assert_json_snapshot!(StructuredError::from(&err), @r#"
    {
      "code": "NO_ACTIVE_SESSION",
      "numeric_code": 101,
      "message": "No active test session",
      "suggestion": "Start a session with `testflow session start --catalog <id>`",
      "recoverable": true,
      "category": "session"
    }
    "#);
}

#[test]
fn error_display_lines() {
    let lines = [
        FlowError::UnknownStep("rcd-x".into()),
        FlowError::InvalidTransition {
            from: SessionStatus::Completed,
            to: SessionStatus::Paused,
        },
        FlowError::ChecklistItemNotFound("abc".into()),
    ]
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("\n");
    insta::assert_snapshot!(lines, @r"
    Unknown step: rcd-x
    Cannot move test session from completed to paused
    Checklist item not found: abc
    ");
}
