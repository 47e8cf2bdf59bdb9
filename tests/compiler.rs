//! Tests for flattening, naming, and static analysis of form definitions.
mod common;
use common::*;
use kata::builder::{self, TextOptions, when};
use kata::model::{ConditionGroup, Rule};
use kata::prelude::*;
use serde_json::json;

#[test]
fn test_compiler_flattens_signup_form() {
    let schema = Compiler::builder(create_signup_form())
        .build()
        .compile()
        .expect("Failed to compile");

    let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["username", "email"]);
    assert_eq!(schema.get("username").unwrap().name(), "username");
    assert_eq!(schema.get("email").unwrap().kind, FieldKind::Email);

    // Every field gets a validation entry, in the same order.
    let entries: Vec<&str> = schema.validation.entries.keys().map(String::as_str).collect();
    assert_eq!(entries, names);
    assert!(!schema.validation.get("username").unwrap().optional);
}

#[test]
fn test_groups_are_transparent_and_preorder() {
    let schema = compile_ok(&create_wizard_form());
    let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["name", "plan", "age", "license", "seats", "newsletter"]
    );
    assert!(schema.get("extras").is_none());
}

#[test]
fn test_compilation_is_deterministic_and_pure() {
    let definition = create_wizard_form();
    let before = definition.clone();

    let first = compile_ok(&definition);
    let second = compile_ok(&definition);

    assert_eq!(first, second);
    assert_eq!(definition, before, "compile must not modify its input");
    // Names are assigned on the compiled copy only.
    match definition.nodes.get("name") {
        Some(FormNode::Field(field)) => assert!(field.name.is_none()),
        other => panic!("expected a field node, got {:?}", other),
    }
}

#[test]
fn test_group_condition_and_step_are_inherited() {
    let schema = compile_ok(&create_wizard_form());
    let seats = schema.get("seats").unwrap();
    assert_eq!(seats.step, Some(3));
    assert_eq!(seats.show_when, Some(when("plan").eq("pro")));

    let license = schema.get("license").unwrap();
    assert_eq!(license.step, Some(2));
    assert_eq!(license.show_when, Some(when("age").gte(18)));
}

#[test]
fn test_nested_group_conditions_are_combined_outermost_first() {
    let definition = builder::form()
        .field("a", builder::text(TextOptions::default()))
        .field("b", builder::text(TextOptions::default()))
        .group(
            "outer",
            builder::group().show_when(when("a").exists()).group(
                "inner",
                builder::group().show_when(when("b").exists()).field(
                    "c",
                    builder::text(TextOptions::default()).show_when(when("a").eq("x")),
                ),
            ),
        );

    let schema = compile_ok(&definition);
    assert_eq!(
        schema.get("c").unwrap().show_when,
        Some(Condition::all([
            when("a").exists(),
            when("b").exists(),
            when("a").eq("x"),
        ]))
    );
}

#[test]
fn test_step_inheritance_can_be_disabled() {
    let schema = Compiler::builder(create_wizard_form())
        .inherit_group_step(false)
        .build()
        .compile()
        .unwrap();
    assert_eq!(schema.get("seats").unwrap().step, None);
    assert_eq!(schema.get("age").unwrap().step, Some(2));
}

#[test]
fn test_dotted_naming() {
    let schema = Compiler::builder(create_wizard_form())
        .naming(NamingStrategy::Dotted)
        .build()
        .compile()
        .unwrap();
    assert!(schema.get("extras.seats").is_some());
    assert!(schema.get("seats").is_none());
    assert_eq!(schema.get("extras.seats").unwrap().name(), "extras.seats");
}

#[test]
fn test_duplicate_names_are_rejected() {
    let definition = builder::form()
        .field("email", builder::email(TextOptions::default()))
        .group(
            "billing",
            builder::group().field("email", builder::email(TextOptions::default())),
        );

    let err = compile(&definition).unwrap_err();
    assert_eq!(
        err,
        CompileError::DuplicateFieldName {
            name: "email".to_string(),
            first_path: "email".to_string(),
            second_path: "billing.email".to_string(),
        }
    );

    // The same tree is fine once names are qualified by their group.
    let dotted = Compiler::builder(definition)
        .naming(NamingStrategy::Dotted)
        .build()
        .compile();
    assert!(dotted.is_ok());
}

#[test]
fn test_empty_field_name_is_rejected() {
    let definition = builder::form().field(" ", builder::text(TextOptions::default()));
    assert_eq!(
        compile(&definition).unwrap_err(),
        CompileError::EmptyFieldName {
            path: " ".to_string()
        }
    );
}

#[test]
fn test_unknown_condition_field() {
    let definition = builder::form().field(
        "vat",
        builder::text(TextOptions::default()).show_when(when("country").eq("DE")),
    );

    match compile(&definition) {
        Err(CompileError::UnknownConditionField {
            field,
            referenced_by,
        }) => {
            assert_eq!(field, "country");
            assert_eq!(referenced_by, "vat");
        }
        other => panic!("Expected UnknownConditionField, got {:?}", other),
    }

    let lenient = Compiler::builder(definition)
        .allow_unknown_condition_fields(true)
        .build()
        .compile();
    assert!(lenient.is_ok());
}

#[test]
fn test_condition_on_nested_value_of_a_field_is_known() {
    let definition = builder::form()
        .field("address", builder::address())
        .field(
            "delivery_note",
            builder::textarea(TextOptions::default())
                .show_when(when("address.country").eq("DE")),
        );
    assert!(compile(&definition).is_ok());
}

#[test]
fn test_condition_cycle_is_rejected() {
    let definition = builder::form()
        .field(
            "a",
            builder::text(TextOptions::default()).show_when(when("b").exists()),
        )
        .field(
            "b",
            builder::text(TextOptions::default()).show_when(when("a").exists()),
        );

    let err = compile(&definition).unwrap_err();
    assert!(matches!(err, CompileError::ConditionCycle { .. }));
    assert_eq!(err.to_string(), "Visibility conditions form a cycle: a -> b -> a");
}

#[test]
fn test_self_reference_is_a_cycle() {
    let definition = builder::form().field(
        "a",
        builder::text(TextOptions::default()).show_when(when("a").neq("")),
    );
    assert_eq!(
        compile(&definition).unwrap_err(),
        CompileError::ConditionCycle {
            path: vec!["a".to_string(), "a".to_string()]
        }
    );
}

#[test]
fn test_malformed_conditions_are_rejected() {
    let both = Condition::Group(ConditionGroup {
        and: Some(vec![when("a").exists()]),
        or: Some(vec![when("a").exists()]),
    });
    let missing_operand = Condition::Rule(Rule {
        field: "a".to_string(),
        op: Operator::Gte,
        value: None,
    });
    let unknown_op = Condition::rule("a", Operator::from("between"), json!([1, 2]));
    let empty_group = Condition::Group(ConditionGroup::default());

    for condition in [both, missing_operand, unknown_op, empty_group] {
        let definition = builder::form()
            .field("a", builder::text(TextOptions::default()))
            .field("b", builder::text(TextOptions::default()).show_when(condition));
        match compile(&definition) {
            Err(CompileError::MalformedCondition { referenced_by, .. }) => {
                assert_eq!(referenced_by, "b")
            }
            other => panic!("Expected MalformedCondition, got {:?}", other),
        }
    }
}

#[test]
fn test_invalid_patterns_are_rejected() {
    let bad_field = builder::form().field(
        "code",
        builder::text(TextOptions {
            pattern: Some("([a-z".to_string()),
            ..Default::default()
        }),
    );
    assert!(matches!(
        compile(&bad_field),
        Err(CompileError::InvalidFieldPattern { .. })
    ));

    let bad_condition = builder::form()
        .field("code", builder::text(TextOptions::default()))
        .field(
            "hint",
            builder::text(TextOptions::default()).show_when(when("code").matches("(")),
        );
    assert!(matches!(
        compile(&bad_condition),
        Err(CompileError::InvalidConditionPattern { .. })
    ));
}

#[test]
fn test_step_zero_is_rejected() {
    let definition = builder::form().group(
        "intro",
        builder::group()
            .step(0)
            .field("name", builder::text(TextOptions::default())),
    );
    assert_eq!(
        compile(&definition).unwrap_err(),
        CompileError::InvalidStep {
            path: "intro".to_string(),
            step: 0
        }
    );
}

#[test]
fn test_compile_from_json() {
    let schema = Compiler::from_json(CONTACT_FORM_JSON)
        .expect("Failed to parse definition")
        .build()
        .compile()
        .expect("Failed to compile");

    let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["contactMethod", "email", "phone", "signature"]);

    let method = schema.get("contactMethod").unwrap();
    assert_eq!(method.kind, FieldKind::Select);
    assert_eq!(method.options.len(), 2);

    let signature = schema.get("signature").unwrap();
    assert_eq!(signature.kind, FieldKind::Custom);
    assert_eq!(signature.component.as_ref().unwrap().as_str(), "signature-pad");
    assert_eq!(signature.component_props.get("penColor"), Some(&json!("blue")));
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let result = Compiler::from_json("{ not json");
    assert!(matches!(result, Err(CompileError::JsonParseError(_))));

    let result = values_from_json("[1, 2]");
    assert!(matches!(result, Err(CompileError::JsonParseError(_))));
}

#[test]
fn test_mistyped_condition_is_a_parse_error() {
    let mistyped_key = r#"{
        "age": { "kind": "field", "type": "number" },
        "license": {
            "kind": "field",
            "type": "text",
            "required": true,
            "showWhen": { "feild": "age", "op": "gte", "value": 18 }
        }
    }"#;
    let missing_op = r#"{
        "age": { "kind": "field", "type": "number" },
        "license": {
            "kind": "field",
            "type": "text",
            "showWhen": { "field": "age", "value": 18 }
        }
    }"#;
    let stray_group_key = r#"{
        "age": { "kind": "field", "type": "number" },
        "license": {
            "kind": "field",
            "type": "text",
            "showWhen": { "all": [{ "field": "age", "op": "gte", "value": 18 }] }
        }
    }"#;

    for json in [mistyped_key, missing_op, stray_group_key] {
        match Compiler::from_json(json) {
            Err(CompileError::JsonParseError(_)) => {}
            Ok(builder) => panic!(
                "Expected JsonParseError, parsed {:?}",
                builder.build().definition()
            ),
            Err(other) => panic!("Expected JsonParseError, got {:?}", other),
        }
    }
}

#[test]
fn test_empty_condition_object_is_rejected() {
    let json = r#"{
        "age": { "kind": "field", "type": "number" },
        "license": { "kind": "field", "type": "text", "showWhen": {} }
    }"#;
    let result = Compiler::from_json(json).unwrap().build().compile();
    match result {
        Err(CompileError::MalformedCondition { referenced_by, .. }) => {
            assert_eq!(referenced_by, "license")
        }
        other => panic!("Expected MalformedCondition, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_type_still_compiles() {
    let json = r#"{ "rating": { "kind": "field", "type": "stars" } }"#;
    let schema = Compiler::from_json(json).unwrap().build().compile().unwrap();
    assert_eq!(
        schema.get("rating").unwrap().kind,
        FieldKind::Other("stars".to_string())
    );
}

#[test]
fn test_with_meta_decorates_without_recompiling() {
    let schema = compile_ok(&create_wizard_form());
    let meta = FormMeta {
        title: Some("Sign up".to_string()),
        steps: vec![
            builder::wizard_step(1, "About you"),
            builder::wizard_step(2, "Details"),
        ],
        ..Default::default()
    };

    let decorated = with_meta(schema.clone(), meta.clone());
    assert_eq!(decorated.fields, schema.fields);
    assert_eq!(decorated.validation, schema.validation);
    assert_eq!(decorated.meta, meta);
}

#[test]
fn test_meta_from_json() {
    let meta = FormMeta::from_json(
        r#"{ "title": "Order", "submitLabel": "Pay", "disableOnInvalid": true,
             "steps": [{ "number": 1, "title": "Cart" }] }"#,
    )
    .unwrap();
    assert_eq!(meta.submit_label.as_deref(), Some("Pay"));
    assert!(meta.disable_on_invalid);
    assert_eq!(meta.steps[0].title, "Cart");
}

#[test]
fn test_default_values() {
    let schema = compile_ok(&create_wizard_form());
    assert_eq!(schema.default_values(), values(json!({ "plan": "free" })));
}

#[test]
fn test_compiled_schema_serializes_round_trip() {
    let schema = compile_ok(&create_signup_form());
    let json = serde_json::to_string(&schema).unwrap();
    let restored: CompiledSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, schema);
}
