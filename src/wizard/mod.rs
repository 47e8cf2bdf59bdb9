//! Multi-step wizard support: partitions a compiled schema by step and gates
//! forward navigation on the validity of the current step's visible fields.

use crate::compiler::{CompiledSchema, WizardStep};
use crate::evaluator::coercion::{is_blank, resolve_path};
use crate::evaluator::is_visible;
use crate::model::{FieldDefinition, FormValues};
use std::sync::Arc;

mod async_validation;
mod validation;

pub use async_validation::{
    AsyncStatus, AsyncTicket, AsyncValidationConfig, AsyncValidationDispatcher,
    AsyncValidationState, AsyncValidator, AsyncVerdict, UNVERIFIED_MESSAGE, UnverifiedPolicy,
};
pub use validation::StepReport;

use validation::validate_fields;

/// The fields of one step, in schema order. Fields without a step belong to step 1.
pub fn fields_for_step(schema: &CompiledSchema, step: u32) -> Vec<&FieldDefinition> {
    schema
        .fields
        .values()
        .filter(|field| field.effective_step() == step)
        .collect()
}

/// The highest step declared by the metadata or any field, and at least 1.
pub fn total_steps(schema: &CompiledSchema) -> u32 {
    schema
        .meta
        .steps
        .iter()
        .map(|s| s.number)
        .chain(schema.fields.values().map(FieldDefinition::effective_step))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Validates the visible fields of one step against synchronous constraints.
pub fn validate_step(schema: &CompiledSchema, step: u32, values: &FormValues) -> StepReport {
    validate_fields(
        schema,
        fields_for_step(schema, step),
        values,
        None,
        UnverifiedPolicy::Allow,
        Some(step),
    )
}

/// The outcome of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Moved { from: u32, to: u32 },
    /// Navigation was a no-op, e.g. `previous` on the first step.
    Stayed { at: u32 },
    /// The current step has invalid or still-validating fields.
    Blocked(StepReport),
}

/// Tracks the current step of a wizard over one compiled schema.
#[derive(Debug, Clone)]
pub struct StepController {
    schema: Arc<CompiledSchema>,
    current: u32,
    total: u32,
    /// Highest step that has passed its gate.
    validated: u32,
    unverified_policy: UnverifiedPolicy,
}

impl StepController {
    pub fn new(schema: Arc<CompiledSchema>) -> Self {
        let total = total_steps(&schema);
        Self {
            schema,
            current: 1,
            total,
            validated: 0,
            unverified_policy: UnverifiedPolicy::Allow,
        }
    }

    pub fn with_unverified_policy(mut self, policy: UnverifiedPolicy) -> Self {
        self.unverified_policy = policy;
        self
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total_steps(&self) -> u32 {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Fraction of the wizard reached, in `(0, 1]`.
    pub fn progress(&self) -> f32 {
        self.current as f32 / self.total as f32
    }

    /// The descriptor for a step; undeclared steps get a generated title.
    pub fn step_info(&self, step: u32) -> WizardStep {
        self.schema
            .meta
            .steps
            .iter()
            .find(|s| s.number == step)
            .cloned()
            .unwrap_or_else(|| WizardStep {
                number: step,
                title: format!("Step {}", step),
                description: None,
            })
    }

    pub fn current_fields(&self) -> Vec<&FieldDefinition> {
        fields_for_step(&self.schema, self.current)
    }

    /// Validates one step, including async outcomes recorded in `async_state`.
    pub fn validate_step(
        &self,
        step: u32,
        values: &FormValues,
        async_state: &AsyncValidationState,
    ) -> StepReport {
        validate_fields(
            &self.schema,
            fields_for_step(&self.schema, step),
            values,
            Some(async_state),
            self.unverified_policy,
            Some(step),
        )
    }

    /// Validates every visible field, as a final submit gate.
    pub fn validate_form(
        &self,
        values: &FormValues,
        async_state: &AsyncValidationState,
    ) -> StepReport {
        validate_fields(
            &self.schema,
            self.schema.fields.values(),
            values,
            Some(async_state),
            self.unverified_policy,
            None,
        )
    }

    /// Whether the submit control should be enabled for these values.
    pub fn submit_enabled(&self, values: &FormValues, async_state: &AsyncValidationState) -> bool {
        self.is_last()
            && (!self.schema.meta.disable_on_invalid
                || self.validate_form(values, async_state).is_valid())
    }

    /// Advances one step if the current step passes its gate. Capped at the last step.
    pub fn next(&mut self, values: &FormValues, async_state: &AsyncValidationState) -> Navigation {
        let report = self.validate_step(self.current, values, async_state);
        if !report.is_valid() {
            log::debug!(
                "Step {} blocked: {} errors, {} pending",
                self.current,
                report.errors.len(),
                report.pending.len()
            );
            return Navigation::Blocked(report);
        }
        self.validated = self.validated.max(self.current);
        if self.current >= self.total {
            return Navigation::Stayed { at: self.current };
        }
        let from = self.current;
        self.current += 1;
        Navigation::Moved {
            from,
            to: self.current,
        }
    }

    /// Like [`next`](Self::next), but first waits for the current step's async validators.
    ///
    /// Fields with a validator and a value that was never validated are validated now.
    pub async fn next_async(
        &mut self,
        values: &FormValues,
        dispatcher: &AsyncValidationDispatcher,
    ) -> Navigation {
        let snapshot = dispatcher.snapshot();
        let mut names = Vec::new();
        for field in fields_for_step(&self.schema, self.current) {
            if field.async_validate.is_none() || !is_visible(field.show_when.as_ref(), values) {
                continue;
            }
            if let Some(value) = resolve_path(values, field.name()) {
                if !is_blank(value)
                    && snapshot.status_for(field.name(), value) == AsyncStatus::Idle
                {
                    dispatcher.validate_now(field, value.clone());
                }
            }
            names.push(field.name().to_string());
        }
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        dispatcher.settle_fields(&names).await;
        self.next(values, &dispatcher.snapshot())
    }

    /// Goes back one step. Never gated.
    pub fn previous(&mut self) -> Navigation {
        if self.current <= 1 {
            return Navigation::Stayed { at: self.current };
        }
        let from = self.current;
        self.current -= 1;
        Navigation::Moved {
            from,
            to: self.current,
        }
    }

    /// Jumps to a step that is behind the current one or directly after a validated one.
    pub fn go_to(&mut self, step: u32) -> Navigation {
        let reachable = step >= 1 && step <= self.total && step <= self.current.max(self.validated + 1);
        if !reachable || step == self.current {
            return Navigation::Stayed { at: self.current };
        }
        let from = self.current;
        self.current = step;
        Navigation::Moved { from, to: step }
    }
}
