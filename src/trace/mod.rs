use crate::model::Operator;
use serde_json::Value;

mod formatter;

pub use formatter::TraceFormatter;

/// A record of how a condition was evaluated, including the values it saw.
///
/// Groups keep only the children that were actually evaluated: an `All`
/// stops at the first false child, an `Any` at the first true one.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTrace {
    Rule {
        field: String,
        op: Operator,
        expected: Option<Value>,
        actual: Option<Value>,
        outcome: bool,
    },
    All {
        children: Vec<ConditionTrace>,
        outcome: bool,
    },
    Any {
        children: Vec<ConditionTrace>,
        outcome: bool,
    },
}

impl ConditionTrace {
    pub fn outcome(&self) -> bool {
        match self {
            ConditionTrace::Rule { outcome, .. }
            | ConditionTrace::All { outcome, .. }
            | ConditionTrace::Any { outcome, .. } => *outcome,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            ConditionTrace::Any { .. } => 1,
            ConditionTrace::All { .. } => 2,
            ConditionTrace::Rule { .. } => 9,
        }
    }
}
