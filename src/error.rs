use thiserror::Error;

/// Errors that can occur while compiling a form definition.
///
/// These are developer-facing: a form whose definition fails to compile must
/// not be shown to a user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Failed to parse form definition JSON: {0}")]
    JsonParseError(String),

    #[error("Field at '{path}' has an empty name")]
    EmptyFieldName { path: String },

    #[error(
        "Field name '{name}' is defined twice: first at '{first_path}', again at '{second_path}'"
    )]
    DuplicateFieldName {
        name: String,
        first_path: String,
        second_path: String,
    },

    #[error("Condition on '{referenced_by}' references unknown field '{field}'")]
    UnknownConditionField {
        field: String,
        referenced_by: String,
    },

    #[error("Condition on '{referenced_by}' has an invalid pattern '{pattern}': {message}")]
    InvalidConditionPattern {
        referenced_by: String,
        pattern: String,
        message: String,
    },

    #[error("Field '{field}' has an invalid validation pattern '{pattern}': {message}")]
    InvalidFieldPattern {
        field: String,
        pattern: String,
        message: String,
    },

    #[error("Condition on '{referenced_by}' is malformed: {message}")]
    MalformedCondition {
        referenced_by: String,
        message: String,
    },

    #[error("Visibility conditions form a cycle: {}", path.join(" -> "))]
    ConditionCycle { path: Vec<String> },

    #[error("Node at '{path}' declares step {step}, steps start at 1")]
    InvalidStep { path: String, step: u32 },
}

/// Errors that can occur while evaluating a visibility condition.
///
/// The public visibility API never surfaces these: it logs them and fails open.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Operator '{operator}' on field '{field}' requires a comparison value")]
    MissingOperand { operator: String, field: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Malformed condition: {0}")]
    MalformedCondition(String),
}

/// A user-facing validation failure for a single field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raised by an async validator that could not reach a verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Async validation failed: {0}")]
pub struct AsyncValidatorError(pub String);

/// Errors reported by a draft persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Draft storage is unavailable: {0}")]
    Unavailable(String),

    #[error("Stored draft for form '{form_id}' is corrupt: {message}")]
    Corrupt { form_id: String, message: String },
}
