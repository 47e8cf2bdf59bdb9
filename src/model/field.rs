use super::{Condition, Constraint};
use crate::wizard::AsyncValidator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The kind of input a field collects.
///
/// Tags not in the known set deserialize to `Other` and render with the
/// generic text capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Password,
    Number,
    Select,
    MultiSelect,
    Checkbox,
    Switch,
    Radio,
    Date,
    Time,
    DateTime,
    File,
    Array,
    Address,
    Map,
    Voice,
    RichText,
    Custom,
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::MultiSelect => "multiselect",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Switch => "switch",
            FieldKind::Radio => "radio",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::DateTime => "datetime",
            FieldKind::File => "file",
            FieldKind::Array => "array",
            FieldKind::Address => "address",
            FieldKind::Map => "map",
            FieldKind::Voice => "voice",
            FieldKind::RichText => "richtext",
            FieldKind::Custom => "custom",
            FieldKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "email" => FieldKind::Email,
            "password" => FieldKind::Password,
            "number" => FieldKind::Number,
            "select" => FieldKind::Select,
            "multiselect" => FieldKind::MultiSelect,
            "checkbox" => FieldKind::Checkbox,
            "switch" => FieldKind::Switch,
            "radio" => FieldKind::Radio,
            "date" => FieldKind::Date,
            "time" => FieldKind::Time,
            "datetime" => FieldKind::DateTime,
            "file" => FieldKind::File,
            "array" => FieldKind::Array,
            "address" => FieldKind::Address,
            "map" => FieldKind::Map,
            "voice" => FieldKind::Voice,
            "richtext" => FieldKind::RichText,
            "custom" => FieldKind::Custom,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the rendering component for a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One choice of an enumerated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }
}

/// Shared handle to a field's async validator.
#[derive(Clone)]
pub struct AsyncValidatorRef(pub Arc<dyn AsyncValidator>);

impl fmt::Debug for AsyncValidatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncValidator")
    }
}

impl PartialEq for AsyncValidatorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A leaf input of a form.
///
/// `name` is assigned by the compiler from the key the field is stored under,
/// so one definition can be reused under several keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Constraint>,
    #[serde(skip)]
    pub async_validate: Option<AsyncValidatorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub component_props: Map<String, Value>,
}

impl FieldDefinition {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            name: None,
            label: None,
            placeholder: None,
            description: None,
            required: false,
            disabled: false,
            default_value: None,
            validation: None,
            async_validate: None,
            debounce_ms: None,
            show_when: None,
            step: None,
            options: Vec::new(),
            component: None,
            component_props: Map::new(),
        }
    }

    /// The compiled name, or an empty string before compilation.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The wizard step this field belongs to.
    pub fn effective_step(&self) -> u32 {
        self.step.unwrap_or(1)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn validation(mut self, constraint: Constraint) -> Self {
        self.validation = Some(constraint);
        self
    }

    pub fn async_validate(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.async_validate = Some(AsyncValidatorRef(Arc::new(validator)));
        self
    }

    pub fn debounce_ms(mut self, millis: u64) -> Self {
        self.debounce_ms = Some(millis);
        self
    }

    pub fn show_when(mut self, condition: Condition) -> Self {
        self.show_when = Some(condition);
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(ComponentId::new(component));
        self
    }

    /// Adds an opaque prop passed through to the rendering component.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.component_props.insert(key.into(), value.into());
        self
    }
}
