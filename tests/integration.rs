//! Integration tests for Kata
//!
//! End-to-end tests that load a definition, compile it, and drive it the way
//! a rendering layer would.
mod common;
use common::*;
use kata::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_contact_form_end_to_end() {
        let schema = Compiler::from_json(CONTACT_FORM_JSON)
            .expect("Failed to parse definition")
            .build()
            .compile()
            .expect("Failed to compile definition");
        let registry = FieldTypeRegistry::new();

        // Only the branch matching the chosen contact method is shown.
        let data = values(json!({ "contactMethod": "phone", "phone": "+49 30 1234" }));
        let shown: Vec<&str> = schema
            .fields
            .values()
            .filter(|f| is_visible(f.show_when.as_ref(), &data))
            .map(|f| f.name())
            .collect();
        assert_eq!(shown, vec!["contactMethod", "phone", "signature"]);

        let signature = schema.get("signature").unwrap();
        assert_eq!(
            registry.resolve_field(signature).component.as_str(),
            "signature-pad"
        );

        let mut wizard = StepController::new(Arc::new(schema));
        assert_eq!(
            wizard.next(&data, &AsyncValidationState::new()),
            Navigation::Stayed { at: 1 }
        );
    }

    #[test]
    fn test_contact_form_rejects_bad_phone() {
        let schema = Compiler::from_json(CONTACT_FORM_JSON)
            .unwrap()
            .build()
            .compile()
            .unwrap();
        let wizard = StepController::new(Arc::new(schema));
        let data = values(json!({ "contactMethod": "phone", "phone": "abc" }));

        let report = wizard.validate_form(&data, &AsyncValidationState::new());
        assert_eq!(report.error_for("phone"), Some("Has an invalid format"));
        // Email is hidden, so its missing value is not reported.
        assert_eq!(report.error_for("email"), None);
        assert_eq!(report.hidden, vec!["email".to_string()]);
    }

    #[test]
    fn test_initial_values_merge_defaults_and_draft() {
        let schema = compile_ok(&create_wizard_form());
        let store = MemoryDraftStore::default();

        assert_eq!(
            initial_values(&schema, &store, "signup"),
            values(json!({ "plan": "free" }))
        );

        let draft = values(json!({ "name": "Ada", "plan": "pro", "stale": true }));
        store.save("signup", &draft).unwrap();
        let restored = initial_values(&schema, &store, "signup");
        assert_eq!(restored, values(json!({ "plan": "pro", "name": "Ada" })));
        assert!(!restored.contains_key("stale"));

        store.clear("signup").unwrap();
        assert_eq!(
            initial_values(&schema, &store, "signup"),
            values(json!({ "plan": "free" }))
        );
    }

    #[test]
    fn test_initial_values_survive_store_failure() {
        let schema = compile_ok(&create_wizard_form());
        let store = MemoryDraftStore::failing();
        assert_eq!(
            initial_values(&schema, &store, "signup"),
            values(json!({ "plan": "free" }))
        );
    }

    #[test]
    fn test_wizard_walkthrough_with_visibility_changes() {
        let schema = Arc::new(compile_ok(&create_wizard_form()));
        let store = MemoryDraftStore::default();
        let mut data = initial_values(&schema, &store, "wizard");
        let async_state = AsyncValidationState::new();
        let mut wizard = StepController::new(Arc::clone(&schema));

        data.insert("name".to_string(), json!("Grace"));
        assert_eq!(wizard.next(&data, &async_state), Navigation::Moved { from: 1, to: 2 });
        store.save("wizard", &data).unwrap();

        // Becoming an adult reveals the license field, which then gates.
        data.insert("age".to_string(), json!(18));
        assert!(matches!(
            wizard.next(&data, &async_state),
            Navigation::Blocked(_)
        ));
        data.insert("age".to_string(), json!(12));
        assert_eq!(wizard.next(&data, &async_state), Navigation::Moved { from: 2, to: 3 });

        // The free plan hides the whole last step.
        assert!(wizard.submit_enabled(&data, &async_state));
        assert_eq!(wizard.next(&data, &async_state), Navigation::Stayed { at: 3 });

        let draft = initial_values(&schema, &store, "wizard");
        assert_eq!(draft.get("name"), Some(&json!("Grace")));
    }
}
