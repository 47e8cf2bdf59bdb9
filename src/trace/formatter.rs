use super::ConditionTrace;
use itertools::Itertools;
use serde_json::Value;

/// Formats condition traces into human-readable explanations.
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format a trace, showing only the part that decided the outcome.
    pub fn format_trace(trace: &ConditionTrace) -> String {
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &ConditionTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let body = match trace {
            ConditionTrace::Rule {
                field,
                op,
                expected,
                actual,
                ..
            } => {
                let seen = format!("{} (was {})", field, Self::format_value(actual.as_ref()));
                if op.takes_operand() {
                    format!(
                        "{} {} {}",
                        seen,
                        op.symbol(),
                        Self::format_value(expected.as_ref())
                    )
                } else {
                    format!("{} {}", seen, op.symbol())
                }
            }
            ConditionTrace::All { children, outcome } => {
                Self::format_group(children, *outcome, false, "AND", "always", current_precedence)
            }
            ConditionTrace::Any { children, outcome } => {
                Self::format_group(children, *outcome, true, "OR", "never", current_precedence)
            }
        };

        // A single decisive child needs no grouping of its own.
        if needs_parens && body.contains(' ') && !Self::is_single_decider(trace) {
            format!("({})", body)
        } else {
            body
        }
    }

    /// `decisive` is the child outcome that settles the group on its own.
    fn format_group(
        children: &[ConditionTrace],
        outcome: bool,
        decisive: bool,
        joiner: &str,
        empty: &str,
        precedence: u8,
    ) -> String {
        if children.is_empty() {
            return empty.to_string();
        }
        if outcome == decisive {
            if let Some(decider) = children.iter().find(|c| c.outcome() == decisive) {
                return Self::format_recursive(decider, precedence);
            }
        }
        children
            .iter()
            .map(|c| Self::format_recursive(c, precedence))
            .join(&format!(" {} ", joiner))
    }

    fn is_single_decider(trace: &ConditionTrace) -> bool {
        match trace {
            ConditionTrace::All { children, outcome } => !outcome && !children.is_empty(),
            ConditionTrace::Any { children, outcome } => *outcome && !children.is_empty(),
            ConditionTrace::Rule { .. } => true,
        }
    }

    /// Format a value for display.
    fn format_value(value: Option<&Value>) -> String {
        match value {
            None => "nothing".to_string(),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;
    use serde_json::json;

    fn rule(field: &str, op: Operator, expected: Value, actual: Value, outcome: bool) -> ConditionTrace {
        ConditionTrace::Rule {
            field: field.to_string(),
            op,
            expected: Some(expected),
            actual: Some(actual),
            outcome,
        }
    }

    #[test]
    fn test_format_rule() {
        let trace = rule("age", Operator::Gte, json!(18), json!(17), false);
        assert_eq!(TraceFormatter::format_trace(&trace), "age (was 17) >= 18");
    }

    #[test]
    fn test_failed_and_shows_only_failing_rule() {
        let trace = ConditionTrace::All {
            children: vec![
                rule("age", Operator::Gte, json!(18), json!(20), true),
                rule("role", Operator::Eq, json!("admin"), json!("user"), false),
            ],
            outcome: false,
        };
        assert_eq!(
            TraceFormatter::format_trace(&trace),
            r#"role (was "user") == "admin""#
        );
    }

    #[test]
    fn test_nested_or_inside_and_gets_parens() {
        let trace = ConditionTrace::All {
            children: vec![
                rule("a", Operator::Eq, json!(1), json!(1), true),
                ConditionTrace::Any {
                    children: vec![
                        rule("b", Operator::Eq, json!(1), json!(0), false),
                        rule("c", Operator::Eq, json!(1), json!(0), false),
                    ],
                    outcome: false,
                },
            ],
            outcome: false,
        };
        assert_eq!(
            TraceFormatter::format_trace(&trace),
            "(b (was 0) == 1 OR c (was 0) == 1)"
        );
    }

    #[test]
    fn test_empty_groups() {
        let all = ConditionTrace::All {
            children: vec![],
            outcome: true,
        };
        let any = ConditionTrace::Any {
            children: vec![],
            outcome: false,
        };
        assert_eq!(TraceFormatter::format_trace(&all), "always");
        assert_eq!(TraceFormatter::format_trace(&any), "never");
    }
}
