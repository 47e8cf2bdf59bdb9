use crate::error::CompileError;
use crate::evaluator::coercion::resolve_path;
use crate::model::{
    Constraint, FieldDefinition, FieldRule, FormDefinition, FormValues, ValidationSchema,
};
use ahash::AHashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod analysis;
mod flatten;
pub mod parsing;

use flatten::{Scope, flatten};

/// How compiled field names are derived from the definition tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStrategy {
    /// A leaf is named by its own key; enclosing groups add nothing.
    #[default]
    Flat,
    /// A leaf is named by the keys of its enclosing groups and its own, joined by `.`.
    Dotted,
}

#[derive(Debug, Clone)]
pub(crate) struct CompileOptions {
    pub naming: NamingStrategy,
    pub allow_unknown_condition_fields: bool,
    pub inherit_group_step: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            naming: NamingStrategy::Flat,
            allow_unknown_condition_fields: false,
            inherit_group_step: true,
        }
    }
}

/// Descriptive metadata for one wizard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardStep {
    pub number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Form-level presentation metadata attached after compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<WizardStep>,
    #[serde(default)]
    pub disable_on_invalid: bool,
}

/// The output of compilation: a flat field map and its validation schema.
///
/// Immutable once produced; recompile if the source definition changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledSchema {
    pub fields: IndexMap<String, FieldDefinition>,
    pub validation: ValidationSchema,
    #[serde(default)]
    pub meta: FormMeta,
}

impl CompiledSchema {
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decorates the schema with form metadata. Fields are not re-derived.
    pub fn with_meta(self, meta: FormMeta) -> Self {
        Self { meta, ..self }
    }

    /// The distinct step numbers used by the fields, ascending.
    pub fn steps(&self) -> Vec<u32> {
        self.fields
            .values()
            .map(FieldDefinition::effective_step)
            .unique()
            .sorted()
            .collect()
    }

    /// The declared `defaultValue` of every field that has one.
    pub fn default_values(&self) -> FormValues {
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                field
                    .default_value
                    .as_ref()
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// Keeps only the values that belong to a compiled field.
    pub fn retain_known(&self, values: &FormValues) -> FormValues {
        self.fields
            .keys()
            .filter_map(|name| {
                resolve_path(values, name).map(|value: &Value| (name.clone(), value.clone()))
            })
            .collect()
    }
}

/// Attaches metadata to a compiled schema.
pub fn with_meta(schema: CompiledSchema, meta: FormMeta) -> CompiledSchema {
    schema.with_meta(meta)
}

/// Compiles a definition with the default options.
pub fn compile(definition: &FormDefinition) -> Result<CompiledSchema, CompileError> {
    Compiler::builder(definition.clone()).build().compile()
}

/// Turns a nested form definition into a [`CompiledSchema`].
pub struct Compiler {
    definition: FormDefinition,
    options: CompileOptions,
}

pub struct CompilerBuilder {
    definition: FormDefinition,
    options: CompileOptions,
}

impl CompilerBuilder {
    pub fn new(definition: FormDefinition) -> Self {
        Self {
            definition,
            options: CompileOptions::default(),
        }
    }

    pub fn naming(mut self, naming: NamingStrategy) -> Self {
        self.options.naming = naming;
        self
    }

    /// Permits conditions on values that are not fields of this form.
    pub fn allow_unknown_condition_fields(mut self, allow: bool) -> Self {
        self.options.allow_unknown_condition_fields = allow;
        self
    }

    pub fn inherit_group_step(mut self, inherit: bool) -> Self {
        self.options.inherit_group_step = inherit;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            definition: self.definition,
            options: self.options,
        }
    }
}

impl Compiler {
    pub fn builder(definition: FormDefinition) -> CompilerBuilder {
        CompilerBuilder::new(definition)
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// The main compilation function. Pure: the definition is never modified.
    pub fn compile(&self) -> Result<CompiledSchema, CompileError> {
        let flat = flatten(&self.definition.nodes, &Scope::default(), &self.options)?;

        let mut fields: IndexMap<String, FieldDefinition> = IndexMap::with_capacity(flat.len());
        let mut paths: AHashMap<String, String> = AHashMap::with_capacity(flat.len());
        for entry in flat {
            let name = entry.field.name().to_string();
            if let Some(first_path) = paths.get(&name) {
                return Err(CompileError::DuplicateFieldName {
                    name,
                    first_path: first_path.clone(),
                    second_path: entry.path,
                });
            }
            log::debug!(
                "Compiled field '{}' ({}) from '{}'",
                name,
                entry.field.kind,
                entry.path
            );
            paths.insert(name.clone(), entry.path);
            fields.insert(name, entry.field);
        }

        analysis::check_definitions(&fields, self.options.allow_unknown_condition_fields)?;
        analysis::check_cycles(&fields)?;

        let validation = ValidationSchema {
            entries: fields
                .iter()
                .map(|(name, field)| (name.clone(), field_rule(field)))
                .collect(),
        };

        log::info!(
            "Compiled form definition: {} top-level nodes, {} fields",
            self.definition.len(),
            fields.len()
        );

        Ok(CompiledSchema {
            fields,
            validation,
            meta: FormMeta::default(),
        })
    }
}

/// Declared validation is optional unless the field is required.
fn field_rule(field: &FieldDefinition) -> FieldRule {
    match &field.validation {
        Some(constraint) => FieldRule {
            constraint: constraint.clone(),
            optional: !field.required,
        },
        None if field.required => FieldRule {
            constraint: Constraint::Any,
            optional: false,
        },
        None => FieldRule::anything(),
    }
}
