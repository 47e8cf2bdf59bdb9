//! Fluent constructors for form definitions.
//!
//! Each field constructor takes its own options bag by value and applies the
//! kind's defaults per call, so no two fields share state. Names are left
//! unset; the compiler assigns them from the key a field is stored under.

use crate::compiler::WizardStep;
use crate::model::{
    Condition, Constraint, FieldDefinition, FieldKind, FieldOption, FormDefinition,
    GroupDefinition, Operator, TextFormat,
};
use serde_json::Value;

const TEXT_MAX_LENGTH: usize = 255;
const LONG_TEXT_MAX_LENGTH: usize = 5000;
const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChoiceOptions {
    pub options: Vec<FieldOption>,
    /// For multi-value kinds only.
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct BooleanOptions {
    /// e.g. an "accept the terms" checkbox.
    pub must_be_true: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub accept: Vec<String>,
    pub max_size_bytes: Option<u64>,
    pub multiple: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

fn text_like(
    kind: FieldKind,
    opts: TextOptions,
    default_min: usize,
    default_max: usize,
    format: Option<TextFormat>,
) -> FieldDefinition {
    let constraint = Constraint::Text {
        min_length: Some(opts.min_length.unwrap_or(default_min)),
        max_length: Some(opts.max_length.unwrap_or(default_max)),
        pattern: opts.pattern,
        format,
        message: opts.message,
    };
    FieldDefinition::new(kind).validation(constraint)
}

pub fn text(opts: TextOptions) -> FieldDefinition {
    text_like(FieldKind::Text, opts, 0, TEXT_MAX_LENGTH, None)
}

pub fn textarea(opts: TextOptions) -> FieldDefinition {
    text_like(FieldKind::Textarea, opts, 0, LONG_TEXT_MAX_LENGTH, None)
}

pub fn richtext(opts: TextOptions) -> FieldDefinition {
    text_like(FieldKind::RichText, opts, 0, LONG_TEXT_MAX_LENGTH, None)
}

pub fn email(opts: TextOptions) -> FieldDefinition {
    text_like(
        FieldKind::Email,
        opts,
        0,
        TEXT_MAX_LENGTH,
        Some(TextFormat::Email),
    )
}

pub fn password(opts: TextOptions) -> FieldDefinition {
    text_like(
        FieldKind::Password,
        opts,
        PASSWORD_MIN_LENGTH,
        TEXT_MAX_LENGTH,
        None,
    )
}

pub fn number(opts: NumberOptions) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Number).validation(Constraint::Number {
        min: opts.min,
        max: opts.max,
        integer: opts.integer,
        message: opts.message,
    })
}

fn option_values(options: &[FieldOption]) -> Vec<Value> {
    options.iter().map(|o| o.value.clone()).collect()
}

fn single_choice(kind: FieldKind, opts: ChoiceOptions) -> FieldDefinition {
    let mut field = FieldDefinition::new(kind);
    if !opts.options.is_empty() {
        field.validation = Some(Constraint::OneOf {
            values: option_values(&opts.options),
            message: None,
        });
    }
    field.options = opts.options;
    field
}

pub fn select(opts: ChoiceOptions) -> FieldDefinition {
    single_choice(FieldKind::Select, opts)
}

pub fn radio(opts: ChoiceOptions) -> FieldDefinition {
    single_choice(FieldKind::Radio, opts)
}

pub fn multiselect(opts: ChoiceOptions) -> FieldDefinition {
    let allowed = (!opts.options.is_empty()).then(|| option_values(&opts.options));
    let mut field = FieldDefinition::new(FieldKind::MultiSelect).validation(Constraint::Many {
        min_items: opts.min_items,
        max_items: opts.max_items,
        one_of: allowed,
        message: None,
    });
    field.options = opts.options;
    field
}

pub fn checkbox(opts: BooleanOptions) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Checkbox).validation(Constraint::Boolean {
        must_be_true: opts.must_be_true,
        message: None,
    })
}

pub fn switch(opts: BooleanOptions) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Switch).validation(Constraint::Boolean {
        must_be_true: opts.must_be_true,
        message: None,
    })
}

pub fn date() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Date).validation(Constraint::Date { message: None })
}

pub fn datetime() -> FieldDefinition {
    FieldDefinition::new(FieldKind::DateTime).validation(Constraint::DateTime { message: None })
}

pub fn time() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Time).validation(
        Constraint::Text {
            min_length: None,
            max_length: None,
            pattern: Some(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d)?$".to_string()),
            format: None,
            message: None,
        }
        .with_message("Must be a time (HH:MM)"),
    )
}

/// File constraints are enforced by the upload component, so they travel as props.
pub fn file(opts: FileOptions) -> FieldDefinition {
    let mut field = FieldDefinition::new(FieldKind::File);
    if !opts.accept.is_empty() {
        field = field.prop("accept", opts.accept);
    }
    if let Some(max) = opts.max_size_bytes {
        field = field.prop("maxSize", max);
    }
    if opts.multiple {
        field = field.prop("multiple", true);
    }
    field
}

pub fn array(opts: ListOptions) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Array).validation(Constraint::Many {
        min_items: opts.min_items,
        max_items: opts.max_items,
        one_of: None,
        message: None,
    })
}

pub fn address() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Address)
}

pub fn map() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Map)
}

pub fn voice() -> FieldDefinition {
    FieldDefinition::new(FieldKind::Voice)
}

/// A field rendered by an application-supplied component.
pub fn custom(component: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(FieldKind::Custom).component(component)
}

pub fn group() -> GroupDefinition {
    GroupDefinition::new()
}

pub fn form() -> FormDefinition {
    FormDefinition::new()
}

pub fn wizard_step(number: u32, title: impl Into<String>) -> WizardStep {
    WizardStep {
        number,
        title: title.into(),
        description: None,
    }
}

/// Starts a rule on a field path: `when("age").gte(18)`.
pub fn when(field: impl Into<String>) -> RuleBuilder {
    RuleBuilder {
        field: field.into(),
    }
}

pub struct RuleBuilder {
    field: String,
}

impl RuleBuilder {
    fn with(self, op: Operator, value: impl Into<Value>) -> Condition {
        Condition::rule(self.field, op, value)
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Eq, value)
    }

    pub fn neq(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Neq, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Gte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Lte, value)
    }

    pub fn contains(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Contains, value)
    }

    pub fn matches(self, pattern: impl Into<String>) -> Condition {
        self.with(Operator::Regex, pattern.into())
    }

    pub fn exists(self) -> Condition {
        Condition::unary(self.field, Operator::Exists)
    }

    pub fn not_exists(self) -> Condition {
        Condition::unary(self.field, Operator::NotExists)
    }
}
