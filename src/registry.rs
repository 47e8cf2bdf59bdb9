//! Field type registry: maps a field's kind to the component that renders it.
//!
//! The compiler and the logic engine never consult this; only a rendering
//! layer does. Lookup is total: unknown kinds resolve to the text capability.

use crate::model::{ComponentId, FieldDefinition, FieldKind};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The shape of value a component produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Text,
    Number,
    Boolean,
    Choice,
    Choices,
    Temporal,
    File,
    List,
    Object,
    Media,
}

/// What a rendering layer needs to know to draw a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCapability {
    pub component: ComponentId,
    pub value_shape: ValueShape,
    pub supports_options: bool,
    pub multiline: bool,
}

impl ComponentCapability {
    pub fn new(component: &str, value_shape: ValueShape) -> Self {
        Self {
            component: ComponentId::new(component),
            value_shape,
            supports_options: false,
            multiline: false,
        }
    }

    fn with_options(mut self) -> Self {
        self.supports_options = true;
        self
    }

    fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

/// Defines the built-in capability table and the list of kinds it covers.
///
/// The generated match has no wildcard: adding a `FieldKind` variant without
/// an entry here fails to compile.
macro_rules! define_capabilities {
    ( $( $variant:ident => $component:literal, $shape:ident $(, $modifier:ident)* );* $(;)? ) => {
        const BUILTIN_KINDS: &[FieldKind] = &[ $( FieldKind::$variant ),* ];

        fn builtin_capability(kind: &FieldKind) -> Option<ComponentCapability> {
            match kind {
                $( FieldKind::$variant => Some(
                    ComponentCapability::new($component, ValueShape::$shape) $( .$modifier() )*
                ), )*
                FieldKind::Other(_) => None,
            }
        }
    };
}

define_capabilities! {
    Text => "text-input", Text;
    Textarea => "textarea", Text, multiline;
    Email => "email-input", Text;
    Password => "password-input", Text;
    Number => "number-input", Number;
    Select => "select", Choice, with_options;
    MultiSelect => "multi-select", Choices, with_options;
    Checkbox => "checkbox", Boolean;
    Switch => "switch", Boolean;
    Radio => "radio-group", Choice, with_options;
    Date => "date-picker", Temporal;
    Time => "time-picker", Temporal;
    DateTime => "datetime-picker", Temporal;
    File => "file-upload", File;
    Array => "array-editor", List;
    Address => "address-input", Object;
    Map => "map-picker", Object;
    Voice => "voice-recorder", Media;
    RichText => "rich-text-editor", Text, multiline;
    Custom => "custom", Object;
}

/// Lookup from field kind to rendering capability.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    capabilities: AHashMap<FieldKind, ComponentCapability>,
    fallback: ComponentCapability,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTypeRegistry {
    /// A registry holding the built-in capability for every known kind.
    pub fn new() -> Self {
        let capabilities = BUILTIN_KINDS
            .iter()
            .filter_map(|kind| builtin_capability(kind).map(|cap| (kind.clone(), cap)))
            .collect();
        let fallback = ComponentCapability::new("text-input", ValueShape::Text);
        Self {
            capabilities,
            fallback,
        }
    }

    /// Registers or replaces the capability for a kind, including `Other` tags.
    pub fn with_capability(mut self, kind: FieldKind, capability: ComponentCapability) -> Self {
        self.capabilities.insert(kind, capability);
        self
    }

    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.capabilities.contains_key(kind)
    }

    /// Resolves a kind. Never fails: unregistered kinds get the text capability.
    pub fn resolve(&self, kind: &FieldKind) -> &ComponentCapability {
        self.capabilities.get(kind).unwrap_or_else(|| {
            log::debug!(
                "No component registered for field type '{}', using text input",
                kind
            );
            &self.fallback
        })
    }

    /// Resolves a field. An explicit `component` on the field beats the registry.
    pub fn resolve_field(&self, field: &FieldDefinition) -> Cow<'_, ComponentCapability> {
        let base = self.resolve(&field.kind);
        match &field.component {
            Some(component) => Cow::Owned(ComponentCapability {
                component: component.clone(),
                ..base.clone()
            }),
            None => Cow::Borrowed(base),
        }
    }
}
