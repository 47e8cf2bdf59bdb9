use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// A comparison operator used by a [`Rule`].
///
/// Tags outside the known set are kept as `Unknown` so that a definition
/// written for a newer engine still loads; evaluating such a rule fails open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    Regex,
    Exists,
    NotExists,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::Regex => "regex",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::Unknown(tag) => tag,
        }
    }

    /// The symbol used when rendering an evaluation trace.
    pub fn symbol(&self) -> &str {
        match self {
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Contains => "contains",
            Operator::Regex => "matches",
            Operator::Exists => "exists",
            Operator::NotExists => "is empty",
            Operator::Unknown(tag) => tag,
        }
    }

    /// Whether the operator compares against the rule's `value`.
    pub fn takes_operand(&self) -> bool {
        !matches!(self, Operator::Exists | Operator::NotExists)
    }
}

impl From<&str> for Operator {
    fn from(tag: &str) -> Self {
        match tag {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "contains" => Operator::Contains,
            "regex" => Operator::Regex,
            "exists" => Operator::Exists,
            "not_exists" => Operator::NotExists,
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(tag: String) -> Self {
        Operator::from(tag.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single comparison of a field's live value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Dotted path of the field whose value is compared.
    pub field: String,
    pub op: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// An AND/OR combination of conditions. At most one of the two lists may be set.
///
/// Unknown keys are refused so that a mistyped rule cannot parse as an empty group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Condition>>,
}

/// A boolean expression over form values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Rule(Rule),
    Group(ConditionGroup),
}

impl Condition {
    pub fn rule(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::Rule(Rule {
            field: field.into(),
            op,
            value: Some(value.into()),
        })
    }

    /// A rule without an operand, for `exists` / `not_exists`.
    pub fn unary(field: impl Into<String>, op: Operator) -> Self {
        Condition::Rule(Rule {
            field: field.into(),
            op,
            value: None,
        })
    }

    /// True when every sub-condition holds.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Group(ConditionGroup {
            and: Some(conditions.into_iter().collect()),
            or: None,
        })
    }

    /// True when at least one sub-condition holds.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Group(ConditionGroup {
            and: None,
            or: Some(conditions.into_iter().collect()),
        })
    }

    /// Conjunction of `self` and `other`, flattening nested `and` groups on the left.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::Group(ConditionGroup {
                and: Some(mut items),
                or: None,
            }) => {
                items.push(other);
                Condition::all(items)
            }
            this => Condition::all([this, other]),
        }
    }

    /// Collects the field paths this condition reads.
    pub fn referenced_fields<'a>(&'a self, fields: &mut HashSet<&'a str>) {
        match self {
            Condition::Rule(rule) => {
                fields.insert(rule.field.as_str());
            }
            Condition::Group(group) => {
                for child in group.and.iter().chain(group.or.iter()).flatten() {
                    child.referenced_fields(fields);
                }
            }
        }
    }
}
