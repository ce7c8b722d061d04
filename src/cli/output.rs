use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::Serialize;

use crate::error::{ErrorCode, FlowError, Result};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON in the robot envelope
    Json,
    /// Plain text without colors or formatting
    Plain,
}

impl OutputFormat {
    /// Resolve the effective format. `--robot` wins, then an explicit
    /// `--output-format`, then the configured default.
    #[must_use]
    pub fn from_args(robot: bool, format: Option<Self>, configured: &str) -> Self {
        if robot {
            return Self::Json;
        }
        format.unwrap_or_else(|| Self::from_config(configured))
    }

    fn from_config(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }

    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, Self::Human)
    }

    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json)
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> RobotResponse<T> {
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    #[serde(rename = "error")]
    StructuredError {
        /// Error code enum value (e.g., "NO_ACTIVE_SESSION")
        code: ErrorCode,
        numeric_code: u16,
        message: String,
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

/// Robot error envelope carrying code, suggestion and context.
pub fn robot_error_structured(err: &FlowError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::from(err),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
        warnings: Vec::new(),
    }
}

impl From<&FlowError> for RobotStatus {
    fn from(err: &FlowError) -> Self {
        let structured = err.to_structured();
        Self::StructuredError {
            code: structured.code,
            numeric_code: structured.numeric_code,
            message: structured.message,
            suggestion: structured.suggestion,
            context: structured.context,
            recoverable: structured.recoverable,
            category: structured.category,
        }
    }
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>) -> Result<()> {
    emit_json(response)
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    colors: bool,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
            colors: true,
        }
    }

    /// Layout for `--output-format plain`.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
            colors: false,
        }
    }

    #[must_use]
    pub const fn for_format(format: OutputFormat) -> Self {
        if format.use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.colors {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        let line = self.bold(text);
        self.lines.push(line);
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        let line = self.bold(text);
        self.lines.push(line);
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key = format!("{key:width$}", width = self.key_width);
        let key = if self.colors {
            style(key).dim().to_string()
        } else {
            key
        };
        self.lines.push(format!("{key} {value}"));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// Lifecycle notification printed alongside human output.
pub fn emit_notice(format: OutputFormat, title: &str, description: &str) {
    if format.use_colors() {
        eprintln!("{} {}", style(format!("[{title}]")).cyan().bold(), description);
    } else {
        eprintln!("[{title}] {description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_args_robot_overrides() {
        assert_eq!(
            OutputFormat::from_args(true, Some(OutputFormat::Plain), "human"),
            OutputFormat::Json
        );
    }

    #[test]
    fn output_format_from_args_uses_explicit() {
        assert_eq!(
            OutputFormat::from_args(false, Some(OutputFormat::Plain), "json"),
            OutputFormat::Plain
        );
    }

    #[test]
    fn output_format_from_args_falls_back_to_config() {
        assert_eq!(OutputFormat::from_args(false, None, "json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_args(false, None, "human"), OutputFormat::Human);
    }

    #[test]
    fn plain_layout_has_no_ansi() {
        let mut layout = HumanLayout::plain();
        layout.title("Session").kv("Status", "in-progress");
        let rendered = layout.build();
        assert!(!rendered.contains('\u{1b}'));
        assert!(rendered.starts_with("Session\n"));
    }

    #[test]
    fn robot_error_structured_includes_all_fields() {
        let err = FlowError::UnknownStep("zz".into());
        let response = robot_error_structured(&err);

        match response.status {
            RobotStatus::StructuredError {
                code,
                numeric_code,
                message,
                suggestion,
                recoverable,
                category,
                ..
            } => {
                assert_eq!(code, ErrorCode::UnknownStep);
                assert_eq!(numeric_code, 105);
                assert!(message.contains("zz"));
                assert!(!suggestion.is_empty());
                assert!(recoverable);
                assert_eq!(category, "session");
            }
            RobotStatus::Ok => panic!("Expected StructuredError status"),
        }
    }

    #[test]
    fn robot_error_structured_serialization() {
        let err = FlowError::NoActiveSession;
        let response = robot_error_structured(&err);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("NO_ACTIVE_SESSION"));
        assert!(json.contains("\"numeric_code\":101"));
        assert!(json.contains("\"recoverable\":true"));
        assert!(json.contains("\"category\":\"session\""));
    }

    #[test]
    fn robot_ok_serializes_status() {
        let json = serde_json::to_value(robot_ok(serde_json::json!({"n": 1}))).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["data"]["n"], 1);
        assert!(json.get("warnings").is_none());
    }
}
