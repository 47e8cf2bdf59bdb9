pub mod condition;
pub mod constraint;
pub mod field;
pub mod group;

pub use condition::*;
pub use constraint::*;
pub use field::*;
pub use group::*;

/// A snapshot of form values, keyed by field name.
pub type FormValues = serde_json::Map<String, serde_json::Value>;
