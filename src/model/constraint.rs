use crate::error::ValidationError;
use crate::evaluator::coercion::{is_blank, loose_eq, resolve_path, to_number};
use crate::evaluator::pattern::cached_regex;
use crate::model::FormValues;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
static URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").ok());
static DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").ok());
static DATETIME_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])[T ]([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?(Z|[+-]([01]\d|2[0-3]):?[0-5]\d)?$",
    )
    .ok()
});

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    Email,
    Url,
}

/// A composable value constraint attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    Any,
    Text {
        #[serde(default)]
        min_length: Option<usize>,
        #[serde(default)]
        max_length: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        format: Option<TextFormat>,
        #[serde(default)]
        message: Option<String>,
    },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
        #[serde(default)]
        message: Option<String>,
    },
    Boolean {
        #[serde(default)]
        must_be_true: bool,
        #[serde(default)]
        message: Option<String>,
    },
    OneOf {
        values: Vec<Value>,
        #[serde(default)]
        message: Option<String>,
    },
    Many {
        #[serde(default)]
        min_items: Option<usize>,
        #[serde(default)]
        max_items: Option<usize>,
        #[serde(default)]
        one_of: Option<Vec<Value>>,
        #[serde(default)]
        message: Option<String>,
    },
    Date {
        #[serde(default)]
        message: Option<String>,
    },
    DateTime {
        #[serde(default)]
        message: Option<String>,
    },
}

impl Constraint {
    pub fn text(min_length: Option<usize>, max_length: Option<usize>) -> Self {
        Constraint::Text {
            min_length,
            max_length,
            pattern: None,
            format: None,
            message: None,
        }
    }

    /// Overrides the message reported when the constraint fails.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            Constraint::Any => {}
            Constraint::Text { message, .. }
            | Constraint::Number { message, .. }
            | Constraint::Boolean { message, .. }
            | Constraint::OneOf { message, .. }
            | Constraint::Many { message, .. }
            | Constraint::Date { message }
            | Constraint::DateTime { message } => *message = text,
        }
        self
    }

    /// The regex source this constraint compiles at check time, if any.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Constraint::Text {
                pattern: Some(p), ..
            } => Some(p),
            _ => None,
        }
    }

    /// Checks a non-blank value against the constraint.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::Any => Ok(()),
            Constraint::Text {
                min_length,
                max_length,
                pattern,
                format,
                message,
            } => {
                let Value::String(text) = value else {
                    return fail(message, "Must be text".to_string());
                };
                let length = text.chars().count();
                if let Some(min) = min_length {
                    if length < *min {
                        return fail(message, format!("Must be at least {} characters", min));
                    }
                }
                if let Some(max) = max_length {
                    if length > *max {
                        return fail(message, format!("Must be at most {} characters", max));
                    }
                }
                if let Some(format) = format {
                    let (re, label) = match format {
                        TextFormat::Email => (&*EMAIL_PATTERN, "Must be a valid email address"),
                        TextFormat::Url => (&*URL_PATTERN, "Must be a valid URL"),
                    };
                    if !re.as_ref().is_some_and(|re| re.is_match(text)) {
                        return fail(message, label.to_string());
                    }
                }
                if let Some(source) = pattern {
                    let matched = cached_regex(source)
                        .map_err(|e| format!("Invalid pattern '{}': {}", source, e))?
                        .is_match(text);
                    if !matched {
                        return fail(message, "Has an invalid format".to_string());
                    }
                }
                Ok(())
            }
            Constraint::Number {
                min,
                max,
                integer,
                message,
            } => {
                // Booleans compare as 1/0 in conditions but are not numbers here.
                let number = match value {
                    Value::Bool(_) => None,
                    other => to_number(other),
                };
                let Some(number) = number else {
                    return fail(message, "Must be a number".to_string());
                };
                if *integer && number.fract() != 0.0 {
                    return fail(message, "Must be a whole number".to_string());
                }
                if let Some(min) = min {
                    if number < *min {
                        return fail(message, format!("Must be at least {}", min));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return fail(message, format!("Must be at most {}", max));
                    }
                }
                Ok(())
            }
            Constraint::Boolean {
                must_be_true,
                message,
            } => match value {
                Value::Bool(false) if *must_be_true => {
                    fail(message, "Must be checked".to_string())
                }
                Value::Bool(_) => Ok(()),
                _ => fail(message, "Must be true or false".to_string()),
            },
            Constraint::OneOf { values, message } => {
                if values.iter().any(|allowed| loose_eq(allowed, value)) {
                    Ok(())
                } else {
                    fail(message, "Is not one of the allowed options".to_string())
                }
            }
            Constraint::Many {
                min_items,
                max_items,
                one_of,
                message,
            } => {
                let Value::Array(items) = value else {
                    return fail(message, "Must be a list".to_string());
                };
                if let Some(min) = min_items {
                    if items.len() < *min {
                        return fail(message, format!("Select at least {}", min));
                    }
                }
                if let Some(max) = max_items {
                    if items.len() > *max {
                        return fail(message, format!("Select at most {}", max));
                    }
                }
                if let Some(allowed) = one_of {
                    let all_allowed = items
                        .iter()
                        .all(|item| allowed.iter().any(|a| loose_eq(a, item)));
                    if !all_allowed {
                        return fail(message, "Contains an option that is not allowed".to_string());
                    }
                }
                Ok(())
            }
            Constraint::Date { message } => match value {
                Value::String(text) if is_calendar_date(&DATE_PATTERN, text) => Ok(()),
                _ => fail(message, "Must be a date (YYYY-MM-DD)".to_string()),
            },
            Constraint::DateTime { message } => match value {
                Value::String(text) if is_calendar_date(&DATETIME_PATTERN, text) => Ok(()),
                _ => fail(message, "Must be a date and time (YYYY-MM-DDTHH:MM)".to_string()),
            },
        }
    }
}

/// Matches `text` against a pattern whose first three groups are year, month and day,
/// and rejects days past the end of the month.
fn is_calendar_date(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    let Some(captures) = pattern.as_ref().and_then(|re| re.captures(text)) else {
        return false;
    };
    let part = |i: usize| captures.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (part(1), part(2), part(3)) else {
        return false;
    };
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let last_day = match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    day <= last_day
}

fn fail(custom: &Option<String>, default: String) -> Result<(), String> {
    Err(custom.clone().unwrap_or(default))
}

/// The compiled validation entry for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub constraint: Constraint,
    pub optional: bool,
}

impl FieldRule {
    /// The entry used for fields that declare no validation.
    pub fn anything() -> Self {
        Self {
            constraint: Constraint::Any,
            optional: true,
        }
    }

    pub fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let blank = match value {
            None => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(v) => is_blank(v),
        };
        match value {
            _ if blank && self.optional => Ok(()),
            _ if blank => Err(REQUIRED_MESSAGE.to_string()),
            Some(v) => self.constraint.check(v),
            None => Ok(()),
        }
    }
}

/// Per-field constraints keyed by compiled field name.
///
/// Names without an entry accept anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSchema {
    pub entries: IndexMap<String, FieldRule>,
}

impl ValidationSchema {
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.entries.get(name)
    }

    pub fn check(&self, name: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        match self.entries.get(name) {
            Some(rule) => rule
                .check(value)
                .map_err(|message| ValidationError::new(name, message)),
            None => Ok(()),
        }
    }

    /// Checks every entry against `values`, in schema order.
    pub fn check_all(&self, values: &FormValues) -> Vec<ValidationError> {
        self.entries
            .keys()
            .filter_map(|name| self.check(name, resolve_path(values, name)).err())
            .collect()
    }
}
