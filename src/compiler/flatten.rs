use super::{CompileOptions, NamingStrategy};
use crate::error::CompileError;
use crate::model::{Condition, FieldDefinition, FormNode};
use indexmap::IndexMap;

/// A leaf with its compiled name and the key path it was found at.
#[derive(Debug)]
pub(super) struct FlatField {
    pub path: String,
    pub field: FieldDefinition,
}

/// What a node inherits from its enclosing groups.
#[derive(Debug, Clone, Default)]
pub(super) struct Scope<'a> {
    path: Vec<&'a str>,
    step: Option<u32>,
    conditions: Vec<&'a Condition>,
}

impl<'a> Scope<'a> {
    fn path_to(&self, key: &str) -> String {
        self.path
            .iter()
            .copied()
            .chain(std::iter::once(key))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn enter(&self, key: &'a str, step: Option<u32>, condition: Option<&'a Condition>) -> Self {
        let mut path = self.path.clone();
        path.push(key);
        let mut conditions = self.conditions.clone();
        conditions.extend(condition);
        Self {
            path,
            step: step.or(self.step),
            conditions,
        }
    }
}

/// Flattens a node map in pre-order. Groups contribute only their descendants.
///
/// Each call returns a fresh list; nothing is accumulated across calls.
pub(super) fn flatten<'a>(
    nodes: &'a IndexMap<String, FormNode>,
    scope: &Scope<'a>,
    options: &CompileOptions,
) -> Result<Vec<FlatField>, CompileError> {
    let mut flat = Vec::new();
    for (key, node) in nodes {
        let path = scope.path_to(key);
        match node {
            FormNode::Field(field) => {
                check_step(field.step, &path)?;
                flat.push(compile_leaf(key, field, path, scope, options)?);
            }
            FormNode::Group(group) => {
                check_step(group.step, &path)?;
                let inner = scope.enter(key, group.step, group.show_when.as_ref());
                flat.extend(flatten(&group.fields, &inner, options)?);
            }
        }
    }
    Ok(flat)
}

fn compile_leaf(
    key: &str,
    field: &FieldDefinition,
    path: String,
    scope: &Scope<'_>,
    options: &CompileOptions,
) -> Result<FlatField, CompileError> {
    if key.trim().is_empty() {
        return Err(CompileError::EmptyFieldName { path });
    }

    let name = match options.naming {
        NamingStrategy::Flat => key.to_string(),
        NamingStrategy::Dotted => path.clone(),
    };

    let mut compiled = field.clone();
    compiled.name = Some(name);
    if options.inherit_group_step {
        compiled.step = field.step.or(scope.step);
    }
    compiled.show_when = combine_conditions(&scope.conditions, field.show_when.as_ref());

    Ok(FlatField {
        path,
        field: compiled,
    })
}

/// Enclosing group conditions (outermost first) AND-ed with the field's own.
fn combine_conditions(inherited: &[&Condition], own: Option<&Condition>) -> Option<Condition> {
    let mut all: Vec<Condition> = inherited
        .iter()
        .copied()
        .chain(own)
        .cloned()
        .collect();
    match all.len() {
        0 => None,
        1 => all.pop(),
        _ => Some(Condition::all(all)),
    }
}

fn check_step(step: Option<u32>, path: &str) -> Result<(), CompileError> {
    match step {
        Some(0) => Err(CompileError::InvalidStep {
            path: path.to_string(),
            step: 0,
        }),
        _ => Ok(()),
    }
}
