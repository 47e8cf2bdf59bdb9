use crate::error::CompileError;
use crate::evaluator::pattern::cached_regex;
use crate::model::{Condition, FieldDefinition, Operator};
use ahash::AHashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::HashSet;

/// Maps a condition path to the compiled field it reads.
///
/// `address.city` reads the `address` field when no field is named `address.city`.
fn owning_field<'f>(
    fields: &'f IndexMap<String, FieldDefinition>,
    path: &str,
) -> Option<&'f str> {
    if let Some((name, _)) = fields.get_key_value(path) {
        return Some(name.as_str());
    }
    let mut prefix = path;
    while let Some((head, _)) = prefix.rsplit_once('.') {
        if let Some((name, _)) = fields.get_key_value(head) {
            return Some(name.as_str());
        }
        prefix = head;
    }
    None
}

/// Checks the static shape of every field's condition and validation pattern.
pub(super) fn check_definitions(
    fields: &IndexMap<String, FieldDefinition>,
    allow_unknown_fields: bool,
) -> Result<(), CompileError> {
    for (name, field) in fields {
        if let Some(pattern) = field.validation.as_ref().and_then(|c| c.pattern()) {
            cached_regex(pattern).map_err(|e| CompileError::InvalidFieldPattern {
                field: name.clone(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(condition) = &field.show_when {
            check_condition(condition, name, fields, allow_unknown_fields)?;
        }
    }
    Ok(())
}

fn check_condition(
    condition: &Condition,
    referenced_by: &str,
    fields: &IndexMap<String, FieldDefinition>,
    allow_unknown_fields: bool,
) -> Result<(), CompileError> {
    let malformed = |message: String| CompileError::MalformedCondition {
        referenced_by: referenced_by.to_string(),
        message,
    };

    match condition {
        Condition::Group(group) => {
            if group.and.is_some() && group.or.is_some() {
                return Err(malformed(
                    "a condition group may set either 'and' or 'or', not both".to_string(),
                ));
            }
            if group.and.is_none() && group.or.is_none() {
                return Err(malformed(
                    "a condition group must set 'and' or 'or'".to_string(),
                ));
            }
            for child in group.and.iter().chain(group.or.iter()).flatten() {
                check_condition(child, referenced_by, fields, allow_unknown_fields)?;
            }
            Ok(())
        }
        Condition::Rule(rule) => {
            if let Operator::Unknown(tag) = &rule.op {
                return Err(malformed(format!("unknown operator '{}'", tag)));
            }
            if rule.op.takes_operand() && rule.value.is_none() {
                return Err(malformed(format!(
                    "operator '{}' on '{}' needs a value",
                    rule.op, rule.field
                )));
            }
            if rule.op == Operator::Regex {
                if let Some(pattern) = rule.value.as_ref().and_then(|v| v.as_str()) {
                    cached_regex(pattern).map_err(|e| CompileError::InvalidConditionPattern {
                        referenced_by: referenced_by.to_string(),
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })?;
                }
            }
            if !allow_unknown_fields && owning_field(fields, &rule.field).is_none() {
                return Err(CompileError::UnknownConditionField {
                    field: rule.field.clone(),
                    referenced_by: referenced_by.to_string(),
                });
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Rejects fields whose visibility transitively depends on themselves.
pub(super) fn check_cycles(fields: &IndexMap<String, FieldDefinition>) -> Result<(), CompileError> {
    let graph: AHashMap<&str, Vec<&str>> = fields
        .iter()
        .map(|(name, field)| {
            let mut referenced = HashSet::new();
            if let Some(condition) = &field.show_when {
                condition.referenced_fields(&mut referenced);
            }
            let edges = referenced
                .into_iter()
                .filter_map(|path| owning_field(fields, path))
                .unique()
                .sorted()
                .collect();
            (name.as_str(), edges)
        })
        .collect();

    let mut marks: AHashMap<&str, Mark> = AHashMap::new();
    let mut stack: Vec<&str> = Vec::new();
    for name in fields.keys() {
        visit(name, &graph, &mut marks, &mut stack)?;
    }
    Ok(())
}

fn visit<'a>(
    node: &'a str,
    graph: &AHashMap<&'a str, Vec<&'a str>>,
    marks: &mut AHashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Result<(), CompileError> {
    match marks.get(node) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|n| *n == node).unwrap_or(0);
            let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            path.push(node.to_string());
            return Err(CompileError::ConditionCycle { path });
        }
        None => {}
    }

    marks.insert(node, Mark::Visiting);
    stack.push(node);
    for &next in graph.get(node).into_iter().flatten() {
        visit(next, graph, marks, stack)?;
    }
    stack.pop();
    marks.insert(node, Mark::Done);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;

    fn field_with(condition: Option<Condition>) -> FieldDefinition {
        let mut field = FieldDefinition::new(FieldKind::Text);
        field.show_when = condition;
        field
    }

    #[test]
    fn test_owning_field_walks_up_dotted_paths() {
        let mut fields = IndexMap::new();
        fields.insert("address".to_string(), field_with(None));
        assert_eq!(owning_field(&fields, "address.city"), Some("address"));
        assert_eq!(owning_field(&fields, "address"), Some("address"));
        assert_eq!(owning_field(&fields, "phone"), None);
    }

    #[test]
    fn test_cycle_is_reported_with_its_path() {
        let mut fields = IndexMap::new();
        fields.insert(
            "a".to_string(),
            field_with(Some(Condition::unary("b", Operator::Exists))),
        );
        fields.insert(
            "b".to_string(),
            field_with(Some(Condition::unary("a", Operator::Exists))),
        );
        let err = check_cycles(&fields).unwrap_err();
        assert_eq!(
            err,
            CompileError::ConditionCycle {
                path: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            }
        );
    }

    #[test]
    fn test_chain_without_cycle_passes() {
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), field_with(None));
        fields.insert(
            "b".to_string(),
            field_with(Some(Condition::unary("a", Operator::Exists))),
        );
        fields.insert(
            "c".to_string(),
            field_with(Some(Condition::all([
                Condition::unary("a", Operator::Exists),
                Condition::unary("b", Operator::Exists),
            ]))),
        );
        assert!(check_cycles(&fields).is_ok());
    }
}
