//! Common test utilities for building form definitions and value snapshots.
use kata::builder::{self, BooleanOptions, ChoiceOptions, NumberOptions, TextOptions, when};
use kata::error::DraftError;
use kata::prelude::*;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::result::Result;

/// Builds a value snapshot from a `json!` object literal.
#[allow(dead_code)]
pub fn values(json: Value) -> FormValues {
    match json {
        Value::Object(map) => map,
        other => panic!("test values must be an object, got {}", other),
    }
}

/// A flat two-field form: `username` and `email`, both required.
#[allow(dead_code)]
pub fn create_signup_form() -> FormDefinition {
    builder::form()
        .field(
            "username",
            builder::text(TextOptions {
                min_length: Some(3),
                ..Default::default()
            })
            .label("Username")
            .required(),
        )
        .field(
            "email",
            builder::email(TextOptions::default())
                .label("Email")
                .required(),
        )
}

/// A three-step wizard.
///
/// Step 1: `name` (required). Step 2: `age`, plus `license` shown only when
/// `age >= 18`. Step 3: an `extras` group shown only when `plan == "pro"`.
#[allow(dead_code)]
pub fn create_wizard_form() -> FormDefinition {
    builder::form()
        .field("name", builder::text(TextOptions::default()).required().step(1))
        .field(
            "plan",
            builder::radio(ChoiceOptions {
                options: vec![
                    FieldOption::new("Free", "free"),
                    FieldOption::new("Pro", "pro"),
                ],
                ..Default::default()
            })
            .default_value("free")
            .step(1),
        )
        .field(
            "age",
            builder::number(NumberOptions {
                min: Some(0.0),
                integer: true,
                ..Default::default()
            })
            .required()
            .step(2),
        )
        .field(
            "license",
            builder::text(TextOptions::default())
                .required()
                .step(2)
                .show_when(when("age").gte(18)),
        )
        .group(
            "extras",
            builder::group()
                .step(3)
                .show_when(when("plan").eq("pro"))
                .field(
                    "seats",
                    builder::number(NumberOptions {
                        min: Some(1.0),
                        ..Default::default()
                    })
                    .required(),
                )
                .field(
                    "newsletter",
                    builder::checkbox(BooleanOptions::default()),
                ),
        )
}

/// Compiles with default options, panicking on failure.
#[allow(dead_code)]
pub fn compile_ok(definition: &FormDefinition) -> CompiledSchema {
    compile(definition).expect("definition should compile")
}

/// An in-memory draft store for tests.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<HashMap<String, FormValues>>,
    fail_loads: bool,
}

impl MemoryDraftStore {
    /// A store whose loads always fail.
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            fail_loads: true,
            ..Default::default()
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, form_id: &str, values: &FormValues) -> Result<(), DraftError> {
        self.drafts
            .lock()
            .insert(form_id.to_string(), values.clone());
        Ok(())
    }

    fn load(&self, form_id: &str) -> Result<Option<FormValues>, DraftError> {
        if self.fail_loads {
            return Err(DraftError::Unavailable("storage offline".to_string()));
        }
        Ok(self.drafts.lock().get(form_id).cloned())
    }

    fn clear(&self, form_id: &str) -> Result<(), DraftError> {
        self.drafts.lock().remove(form_id);
        Ok(())
    }
}

/// A sample JSON definition using groups, a condition and a custom component.
#[allow(dead_code)]
pub const CONTACT_FORM_JSON: &str = r#"{
    "contactMethod": {
        "kind": "field",
        "type": "select",
        "label": "Preferred contact",
        "required": true,
        "options": [
            { "label": "Email", "value": "email" },
            { "label": "Phone", "value": "phone" }
        ],
        "validation": { "type": "one_of", "values": ["email", "phone"] }
    },
    "details": {
        "kind": "group",
        "layout": "horizontal",
        "fields": {
            "email": {
                "kind": "field",
                "type": "email",
                "required": true,
                "showWhen": { "field": "contactMethod", "op": "eq", "value": "email" },
                "validation": { "type": "text", "format": "email" }
            },
            "phone": {
                "kind": "field",
                "type": "text",
                "required": true,
                "showWhen": { "field": "contactMethod", "op": "eq", "value": "phone" },
                "validation": { "type": "text", "pattern": "^\\+?[0-9 ]{6,}$" }
            }
        }
    },
    "signature": {
        "kind": "field",
        "type": "custom",
        "component": "signature-pad",
        "componentProps": { "penColor": "blue" }
    }
}"#;
