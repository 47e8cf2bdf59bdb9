use super::async_validation::{AsyncStatus, AsyncValidationState, UnverifiedPolicy};
use crate::compiler::CompiledSchema;
use crate::error::ValidationError;
use crate::evaluator::coercion::resolve_path;
use crate::evaluator::is_visible;
use crate::model::{FieldDefinition, FormValues};
use serde_json::Value;

/// The result of validating a set of fields against one value snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// The step validated, or `None` for a whole-form check.
    pub step: Option<u32>,
    pub errors: Vec<ValidationError>,
    /// Fields whose async validation has not finished for their current value.
    pub pending: Vec<String>,
    /// Fields whose async validator could not reach a verdict.
    pub unverified: Vec<String>,
    /// Fields skipped because they are currently hidden.
    pub hidden: Vec<String>,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.pending.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Validates `fields` in order. Hidden and disabled fields never block.
pub(super) fn validate_fields<'a>(
    schema: &CompiledSchema,
    fields: impl IntoIterator<Item = &'a FieldDefinition>,
    values: &FormValues,
    async_state: Option<&AsyncValidationState>,
    policy: UnverifiedPolicy,
    step: Option<u32>,
) -> StepReport {
    let mut report = StepReport {
        step,
        ..StepReport::default()
    };

    for field in fields {
        let name = field.name();
        if !is_visible(field.show_when.as_ref(), values) {
            report.hidden.push(name.to_string());
            continue;
        }
        if field.disabled {
            continue;
        }

        let value = resolve_path(values, name);
        if let Err(e) = schema.validation.check(name, value) {
            report.errors.push(e);
            continue;
        }

        if field.async_validate.is_none() {
            continue;
        }
        let Some(state) = async_state else {
            continue;
        };
        let current = value.cloned().unwrap_or(Value::Null);
        match state.status_for(name, &current) {
            AsyncStatus::Pending => report.pending.push(name.to_string()),
            AsyncStatus::Invalid(message) => report.errors.push(ValidationError::new(name, message)),
            AsyncStatus::Unverified(message) => match policy {
                UnverifiedPolicy::Block => report.errors.push(ValidationError::new(name, message)),
                UnverifiedPolicy::Allow => report.unverified.push(name.to_string()),
            },
            AsyncStatus::Idle | AsyncStatus::Valid => {}
        }
    }

    report
}
