use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,

    ValidationMissingArgument,
    ValidationInvalidArgument,

    InputOpenFailed,
    InputInvalidCsv,
    InputInvalidJson,
    InputInvalidLine,

    TemplateInvalid,
    TemplateRenderFailed,

    CommandEmpty,
    CommandSpawnFailed,
    CommandFailed,

    LogCreateFailed,

    InternalIoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::InputOpenFailed => "input.open_failed",
            ErrorCode::InputInvalidCsv => "input.invalid_csv",
            ErrorCode::InputInvalidJson => "input.invalid_json",
            ErrorCode::InputInvalidLine => "input.invalid_line",

            ErrorCode::TemplateInvalid => "template.invalid",
            ErrorCode::TemplateRenderFailed => "template.render_failed",

            ErrorCode::CommandEmpty => "command.empty",
            ErrorCode::CommandSpawnFailed => "command.spawn_failed",
            ErrorCode::CommandFailed => "command.failed",

            ErrorCode::LogCreateFailed => "log.create_failed",

            ErrorCode::InternalIoError => "internal.io_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathErrorDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidLineDetails {
    pub line: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFailedDetails {
    pub location: String,
    pub field: String,
    pub record: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Error carried through every fallible xrun operation.
///
/// `message` is what gets printed; `details` keeps the structured context
/// (paths, line numbers, raw records) for callers that want more.
#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let path = path.into();
        let message = format!("invalid configuration in {}: {}", path, err);
        Self::new(
            ErrorCode::ConfigInvalidJson,
            message,
            to_details(PathErrorDetails {
                path,
                error: err.to_string(),
            }),
        )
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        let message = format!("missing required argument: {}", args.join(", "));
        Self::new(
            ErrorCode::ValidationMissingArgument,
            message,
            serde_json::json!({ "args": args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let problem = problem.into();
        let message = format!("invalid argument '{}': {}", field, problem);
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            message,
            to_details(InvalidArgumentDetails { field, problem }),
        )
    }

    pub fn input_open(path: impl Into<String>, error: impl Into<String>) -> Self {
        let path = path.into();
        let error = error.into();
        Self::new(
            ErrorCode::InputOpenFailed,
            format!("failed to open data file {}: {}", path, error),
            to_details(PathErrorDetails { path, error }),
        )
    }

    pub fn input_invalid_csv(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            ErrorCode::InputInvalidCsv,
            format!("failed to read CSV: {}", error),
            serde_json::json!({ "error": error }),
        )
    }

    pub fn input_invalid_json(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            ErrorCode::InputInvalidJson,
            format!("failed to parse JSON: {}", error),
            serde_json::json!({ "error": error }),
        )
        .with_hint("JSON input must be a single array of objects; use a .jsonl file for one object per line")
    }

    pub fn input_invalid_line(line: usize, error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            ErrorCode::InputInvalidLine,
            format!("failed to parse JSON on line {}: {}", line, error),
            to_details(InvalidLineDetails { line, error }),
        )
    }

    pub fn template_invalid(position: usize, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::TemplateInvalid,
            format!("failed to parse template at byte {}: {}", position, problem),
            serde_json::json!({ "position": position, "problem": problem }),
        )
        .with_hint("Placeholders look like {{.field_name}}")
    }

    pub fn template_render(
        location: impl Into<String>,
        field: impl Into<String>,
        problem: &str,
        record: Value,
    ) -> Self {
        let location = location.into();
        let field = field.into();
        let message = format!(
            "template execution error for {}: field '{}' {} (record: {})",
            location, field, problem, record
        );
        Self::new(
            ErrorCode::TemplateRenderFailed,
            message,
            to_details(RenderFailedDetails {
                location,
                field,
                record,
            }),
        )
    }

    pub fn command_empty() -> Self {
        Self::new(
            ErrorCode::CommandEmpty,
            "empty command",
            Value::Object(serde_json::Map::new()),
        )
    }

    pub fn command_spawn(command: impl Into<String>, error: impl Into<String>) -> Self {
        let command = command.into();
        let message = format!("failed to start '{}': {}", command, error.into());
        Self::new(
            ErrorCode::CommandSpawnFailed,
            message,
            to_details(CommandFailedDetails {
                command,
                exit_code: None,
            }),
        )
    }

    pub fn command_failed(command: impl Into<String>, exit_code: Option<i32>) -> Self {
        let command = command.into();
        let message = match exit_code {
            Some(code) => format!("command '{}' exited with status {}", command, code),
            None => format!("command '{}' was terminated by a signal", command),
        };
        Self::new(
            ErrorCode::CommandFailed,
            message,
            to_details(CommandFailedDetails { command, exit_code }),
        )
    }

    pub fn log_create(path: impl Into<String>, error: impl Into<String>) -> Self {
        let path = path.into();
        let error = error.into();
        Self::new(
            ErrorCode::LogCreateFailed,
            format!("failed to create log file {}: {}", path, error),
            to_details(PathErrorDetails { path, error }),
        )
        .with_hint("Pass --no-log-files to run without a log file")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match &context {
            Some(context) => format!("I/O error ({}): {}", context, error),
            None => format!("I/O error: {}", error),
        };
        Self::new(
            ErrorCode::InternalIoError,
            message,
            to_details(InternalErrorDetails { error, context }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Process exit code for a run that stopped on this error.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::ConfigInvalidJson
            | ErrorCode::ValidationMissingArgument
            | ErrorCode::ValidationInvalidArgument => 2,
            _ => 1,
        }
    }
}
