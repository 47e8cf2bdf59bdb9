use super::{Compiler, CompilerBuilder, FormMeta};
use crate::error::CompileError;
use crate::model::{FormDefinition, FormValues};
use serde_json::Value;

impl FormDefinition {
    /// Parses a definition from its JSON form: an object of key -> node,
    /// where each node is tagged with `"kind": "field" | "group"`.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(|e| CompileError::JsonParseError(e.to_string()))
    }
}

impl FormMeta {
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(|e| CompileError::JsonParseError(e.to_string()))
    }
}

impl Compiler {
    /// Creates a compiler builder directly from a JSON definition.
    pub fn from_json(json: &str) -> Result<CompilerBuilder, CompileError> {
        FormDefinition::from_json(json).map(Compiler::builder)
    }
}

/// Parses a JSON object into a value snapshot.
pub fn values_from_json(json: &str) -> Result<FormValues, CompileError> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CompileError::JsonParseError(format!(
            "form values must be a JSON object, found {}",
            other
        ))),
        Err(e) => Err(CompileError::JsonParseError(e.to_string())),
    }
}
