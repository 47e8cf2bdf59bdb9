//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the kata crate.
//! Import it to get the core workflow without importing each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kata::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition_json = std::fs::read_to_string("path/to/form.json")?;
//! let schema = Compiler::from_json(&definition_json)?.build().compile()?;
//!
//! let values = values_from_json(r#"{"country": "DE"}"#)?;
//! for (name, field) in &schema.fields {
//!     println!("{}: visible = {}", name, is_visible(field.show_when.as_ref(), &values));
//! }
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::parsing::values_from_json;
pub use crate::compiler::{
    CompiledSchema, Compiler, FormMeta, NamingStrategy, WizardStep, compile, with_meta,
};

// Model
pub use crate::model::{
    Condition, Constraint, FieldDefinition, FieldKind, FieldOption, FormDefinition, FormNode,
    FormValues, GroupDefinition, Layout, Operator,
};

// Conditional logic
pub use crate::evaluator::{evaluate, explain, is_visible, visibility};
pub use crate::trace::{ConditionTrace, TraceFormatter};

// Rendering lookup
pub use crate::registry::{ComponentCapability, FieldTypeRegistry};

// Wizard
pub use crate::wizard::{
    AsyncStatus, AsyncValidationDispatcher, AsyncValidationState, AsyncValidator, AsyncVerdict,
    Navigation, StepController, StepReport,
};

// Drafts
pub use crate::draft::{DraftStore, initial_values};

// Error types
pub use crate::error::{CompileError, EvaluationError, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
