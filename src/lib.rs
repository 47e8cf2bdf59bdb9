//! # Kata - Declarative Form Schema Engine
//!
//! **Kata** turns a nested, declarative form definition into a flat, validated
//! schema and drives it at runtime: conditional visibility, per-step
//! validation, and multi-step wizard navigation. It renders nothing; a UI layer
//! consumes the compiled schema and asks the engine what to show and whether
//! the user may continue.
//!
//! ## Core Workflow
//!
//! 1.  **Define**: Build a [`FormDefinition`](model::FormDefinition) with the
//!     constructors in [`builder`], or load one from JSON with
//!     [`FormDefinition::from_json`](model::FormDefinition::from_json).
//! 2.  **Compile**: Use `Compiler::builder` (or the [`compile`](compiler::compile)
//!     shortcut) to flatten the tree into a [`CompiledSchema`](compiler::CompiledSchema).
//!     Structural problems such as duplicate names or cyclic conditions are
//!     reported here, not at runtime.
//! 3.  **Evaluate**: Ask [`evaluator::is_visible`] which fields are shown for
//!     the current values.
//! 4.  **Navigate**: Drive a [`StepController`](wizard::StepController) through
//!     the wizard; forward navigation is gated on the current step's visible fields.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kata::builder::{self, ChoiceOptions, NumberOptions, TextOptions, when};
//! use kata::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     // 1. Describe the form.
//!     let definition = builder::form()
//!         .field("username", builder::text(TextOptions::default()).label("Username").required())
//!         .field("email", builder::email(TextOptions::default()).required())
//!         .field(
//!             "age",
//!             builder::number(NumberOptions { min: Some(0.0), ..Default::default() }).step(2),
//!         )
//!         .field(
//!             "license",
//!             builder::select(ChoiceOptions {
//!                 options: vec![FieldOption::new("Car", "car"), FieldOption::new("Bike", "bike")],
//!                 ..Default::default()
//!             })
//!             .step(2)
//!             .show_when(when("age").gte(18)),
//!         );
//!
//!     // 2. Compile it once.
//!     let schema = Arc::new(Compiler::builder(definition).build().compile()?);
//!
//!     // 3. Evaluate visibility for the current values.
//!     let values = values_from_json(r#"{"username": "ada", "email": "ada@example.com", "age": 17}"#)?;
//!     let license = schema.get("license").and_then(|f| f.show_when.as_ref());
//!     println!("license visible: {}", is_visible(license, &values));
//!
//!     // 4. Walk the wizard.
//!     let mut wizard = StepController::new(Arc::clone(&schema));
//!     match wizard.next(&values, &AsyncValidationState::new()) {
//!         Navigation::Moved { to, .. } => println!("-> now on step {}", to),
//!         Navigation::Blocked(report) => println!("-> blocked: {:?}", report.errors),
//!         Navigation::Stayed { at } => println!("-> stayed on step {}", at),
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod compiler;
pub mod draft;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod prelude;
pub mod registry;
pub mod trace;
pub mod wizard;
