use super::coercion::{is_blank, loose_eq, resolve_path, to_display_string, to_number};
use super::pattern::cached_regex;
use crate::error::EvaluationError;
use crate::model::{Condition, ConditionGroup, FormValues, Operator, Rule};
use crate::trace::ConditionTrace;
use serde_json::Value;

// Generates the numeric comparison arms; a side without a numeric view makes the rule false.
macro_rules! compare_numeric {
    ($actual:expr, $expected:expr, $op:tt) => {
        match ($actual.and_then(to_number), to_number($expected)) {
            (Some(a), Some(b)) => a $op b,
            _ => false,
        }
    };
}

/// The core recursive engine for evaluating a condition against one value snapshot.
pub(super) struct ConditionEngine<'a> {
    values: &'a FormValues,
}

impl<'a> ConditionEngine<'a> {
    pub(super) fn new(values: &'a FormValues) -> Self {
        Self { values }
    }

    pub(super) fn evaluate(&self, condition: &Condition) -> Result<ConditionTrace, EvaluationError> {
        match condition {
            Condition::Rule(rule) => self.evaluate_rule(rule),
            Condition::Group(group) => self.evaluate_group(group),
        }
    }

    fn evaluate_group(&self, group: &ConditionGroup) -> Result<ConditionTrace, EvaluationError> {
        match (&group.and, &group.or) {
            (Some(_), Some(_)) => Err(EvaluationError::MalformedCondition(
                "a condition group may set either 'and' or 'or', not both".to_string(),
            )),
            (Some(items), None) => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    let trace = self.evaluate(item)?;
                    let holds = trace.outcome();
                    children.push(trace);
                    if !holds {
                        return Ok(ConditionTrace::All {
                            children,
                            outcome: false,
                        });
                    }
                }
                Ok(ConditionTrace::All {
                    children,
                    outcome: true,
                })
            }
            (None, Some(items)) => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    let trace = self.evaluate(item)?;
                    let holds = trace.outcome();
                    children.push(trace);
                    if holds {
                        return Ok(ConditionTrace::Any {
                            children,
                            outcome: true,
                        });
                    }
                }
                Ok(ConditionTrace::Any {
                    children,
                    outcome: false,
                })
            }
            // An empty group imposes nothing.
            (None, None) => Ok(ConditionTrace::All {
                children: Vec::new(),
                outcome: true,
            }),
        }
    }

    fn evaluate_rule(&self, rule: &Rule) -> Result<ConditionTrace, EvaluationError> {
        let actual = resolve_path(self.values, &rule.field);

        let outcome = match &rule.op {
            Operator::Exists => actual.is_some_and(|v| !is_blank(v)),
            Operator::NotExists => actual.is_none_or(is_blank),
            Operator::Unknown(tag) => return Err(EvaluationError::UnknownOperator(tag.clone())),
            op => {
                let expected = rule
                    .value
                    .as_ref()
                    .ok_or_else(|| EvaluationError::MissingOperand {
                        operator: op.to_string(),
                        field: rule.field.clone(),
                    })?;
                self.compare(op, actual, expected)?
            }
        };

        Ok(ConditionTrace::Rule {
            field: rule.field.clone(),
            op: rule.op.clone(),
            expected: rule.value.clone(),
            actual: actual.cloned(),
            outcome,
        })
    }

    fn compare(
        &self,
        op: &Operator,
        actual: Option<&Value>,
        expected: &Value,
    ) -> Result<bool, EvaluationError> {
        let missing = Value::Null;
        let outcome = match op {
            Operator::Eq => loose_eq(actual.unwrap_or(&missing), expected),
            Operator::Neq => !loose_eq(actual.unwrap_or(&missing), expected),
            Operator::Gt => compare_numeric!(actual, expected, >),
            Operator::Gte => compare_numeric!(actual, expected, >=),
            Operator::Lt => compare_numeric!(actual, expected, <),
            Operator::Lte => compare_numeric!(actual, expected, <=),
            Operator::Contains => match actual {
                Some(Value::Array(items)) => items.iter().any(|item| loose_eq(item, expected)),
                Some(value) => to_display_string(value).contains(&to_display_string(expected)),
                None => false,
            },
            Operator::Regex => {
                let pattern = to_display_string(expected);
                let re = cached_regex(&pattern).map_err(|e| EvaluationError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                re.is_match(&to_display_string(actual.unwrap_or(&missing)))
            }
            other => {
                return Err(EvaluationError::MalformedCondition(format!(
                    "operator '{}' does not compare against a value",
                    other
                )));
            }
        };
        Ok(outcome)
    }
}
