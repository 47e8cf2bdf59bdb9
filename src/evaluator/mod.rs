//! Conditional logic: evaluates `showWhen` conditions against a value snapshot.
//!
//! Every function here is pure. The visibility API fails open: an evaluation
//! fault is logged and the field stays visible, so an internal error can never
//! hide a required control and block completion of the form.

use crate::compiler::CompiledSchema;
use crate::error::EvaluationError;
use crate::model::{Condition, FormValues};
use crate::trace::{ConditionTrace, TraceFormatter};
use indexmap::IndexMap;

pub mod coercion;
mod engine;
pub(crate) mod pattern;

use engine::ConditionEngine;

/// Evaluates a condition, surfacing faults to the caller.
pub fn evaluate(condition: &Condition, values: &FormValues) -> Result<bool, EvaluationError> {
    explain(condition, values).map(|trace| trace.outcome())
}

/// Evaluates a condition and returns the full trace of the decision.
pub fn explain(
    condition: &Condition,
    values: &FormValues,
) -> Result<ConditionTrace, EvaluationError> {
    ConditionEngine::new(values).evaluate(condition)
}

/// Whether a control guarded by `condition` is shown. `None` is always visible.
pub fn is_visible(condition: Option<&Condition>, values: &FormValues) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    match evaluate(condition, values) {
        Ok(visible) => visible,
        Err(e) => {
            log::warn!(
                "Condition evaluation failed, keeping control visible: {} (condition: {:?})",
                e,
                condition
            );
            true
        }
    }
}

/// The visibility verdict for one compiled field.
#[derive(Debug, Clone, PartialEq)]
pub struct Visibility {
    pub visible: bool,
    /// A readable explanation when the field has a condition that evaluated cleanly.
    pub reason: Option<String>,
}

/// Evaluates every compiled field's condition, in schema order.
pub fn visibility(schema: &CompiledSchema, values: &FormValues) -> IndexMap<String, Visibility> {
    schema
        .fields
        .iter()
        .map(|(name, field)| {
            let verdict = match &field.show_when {
                None => Visibility {
                    visible: true,
                    reason: None,
                },
                Some(condition) => match explain(condition, values) {
                    Ok(trace) => Visibility {
                        visible: trace.outcome(),
                        reason: Some(TraceFormatter::format_trace(&trace)),
                    },
                    Err(e) => {
                        log::warn!(
                            "Condition on '{}' failed, keeping it visible: {}",
                            name,
                            e
                        );
                        Visibility {
                            visible: true,
                            reason: None,
                        }
                    }
                },
            };
            (name.clone(), verdict)
        })
        .collect()
}
