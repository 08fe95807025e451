use std::fmt;

/// Reasons a task (or a whole import) fails business rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task name is missing or not text")]
    MissingName,

    #[error("task name must not be empty")]
    EmptyName,

    #[error("start date is invalid")]
    InvalidStartDate,

    #[error("end date is invalid")]
    InvalidEndDate,

    #[error("end date is before start date")]
    InvertedRange,

    #[error("too many tasks ({count}), the limit is {max}")]
    TooManyTasks { count: usize, max: usize },

    #[error("no valid tasks to import")]
    NoValidTasks,

    #[error("task '{0}' not found")]
    UnknownTask(String),

    #[error("select a task first")]
    NothingSelected,

    #[error("no import is waiting for confirmation")]
    NoPendingImport,
}

/// A UI control the host must provide before the chart can be wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Canvas,
    AddTask,
    WeekView,
    MonthView,
    Previous,
    Next,
    Today,
    Export,
    Import,
    TaskDialog,
    RangeLabel,
    Notifications,
}

impl Control {
    pub const REQUIRED: &'static [Control] = &[
        Control::Canvas,
        Control::AddTask,
        Control::WeekView,
        Control::MonthView,
        Control::Previous,
        Control::Next,
        Control::Today,
        Control::Export,
        Control::Import,
        Control::TaskDialog,
        Control::RangeLabel,
        Control::Notifications,
    ];
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GanttError {
    /// Malformed date or document.
    #[error("could not parse {what}: {input}")]
    Parse { what: &'static str, input: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The persistence layer failed. Never retried automatically.
    #[error("storage {operation} failed: {reason}")]
    Storage {
        operation: &'static str,
        reason: String,
    },

    /// A required UI control is missing at startup. Fatal.
    #[error("missing UI controls: {}", join_controls(.missing))]
    Binding { missing: Vec<Control> },
}

fn join_controls(controls: &[Control]) -> String {
    controls
        .iter()
        .map(Control::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GanttError {
    pub fn parse(what: &'static str, input: impl Into<String>) -> Self {
        Self::Parse {
            what,
            input: input.into(),
        }
    }

    pub fn storage(operation: &'static str, reason: impl fmt::Display) -> Self {
        Self::Storage {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Short message suitable for a notification.
    pub fn user_message(&self) -> String {
        let text = match self {
            GanttError::Parse { what, .. } => format!("Invalid {what}"),
            GanttError::Validation(v) => capitalize(&v.to_string()),
            GanttError::Storage { operation, .. } => format!("Could not {operation} tasks"),
            GanttError::Binding { .. } => "The chart could not be initialized".to_string(),
        };
        text.lines().next().unwrap_or_default().to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type Result<T, E = GanttError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_one_line() {
        let err = GanttError::storage("save", "disk full\nerrno 28");
        assert_eq!(err.user_message(), "Could not save tasks");

        let err = GanttError::from(ValidationError::NoValidTasks);
        assert_eq!(err.user_message(), "No valid tasks to import");
    }

    #[test]
    fn binding_error_lists_controls() {
        let err = GanttError::Binding {
            missing: vec![Control::Canvas, Control::Import],
        };
        assert_eq!(err.to_string(), "missing UI controls: Canvas, Import");
    }
}
