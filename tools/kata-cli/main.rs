use clap::{Parser, Subcommand, ValueEnum};
use kata::prelude::*;
use kata::wizard::{fields_for_step, total_steps, validate_step};
use std::fs;
use std::time::Instant;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingCli {
    Flat,
    Dotted,
}

/// A declarative form schema compiler and checker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a form definition and print its flat field map
    Compile {
        /// Path to the form definition JSON file
        definition_path: String,
        /// Optional path to a form metadata JSON file
        #[arg(short, long)]
        meta: Option<String>,
        /// How compiled field names are derived
        #[arg(short, long, value_enum, default_value = "flat")]
        naming: NamingCli,
        /// Print the full compiled schema as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Evaluate visibility and validate a value snapshot against a definition
    Check {
        /// Path to the form definition JSON file
        definition_path: String,
        /// Path to the form values JSON file
        values_path: String,
        /// Validate only this wizard step
        #[arg(short, long)]
        step: Option<u32>,
        /// How compiled field names are derived
        #[arg(short, long, value_enum, default_value = "flat")]
        naming: NamingCli,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            definition_path,
            meta,
            naming,
            json,
        } => run_compile(&definition_path, meta.as_deref(), naming, json),
        Command::Check {
            definition_path,
            values_path,
            step,
            naming,
        } => run_check(&definition_path, &values_path, step, naming),
    }
}

fn load_schema(definition_path: &str, naming: NamingCli) -> CompiledSchema {
    let definition_json = read_file(definition_path, "form definition");
    let naming = match naming {
        NamingCli::Flat => NamingStrategy::Flat,
        NamingCli::Dotted => NamingStrategy::Dotted,
    };

    let compile_start = Instant::now();
    let schema = Compiler::from_json(&definition_json)
        .and_then(|builder| builder.naming(naming).build().compile())
        .unwrap_or_else(|e| exit_with_error(&format!("Compilation failed: {}", e)));
    eprintln!(
        "Compiled {} fields in {:?}",
        schema.len(),
        compile_start.elapsed()
    );
    schema
}

fn run_compile(definition_path: &str, meta_path: Option<&str>, naming: NamingCli, json: bool) {
    let mut schema = load_schema(definition_path, naming);

    if let Some(path) = meta_path {
        let meta = FormMeta::from_json(&read_file(path, "form metadata"))
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid form metadata: {}", e)));
        schema = schema.with_meta(meta);
    }

    if json {
        let output = serde_json::to_string_pretty(&schema)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize schema: {}", e)));
        println!("{}", output);
        return;
    }

    let registry = FieldTypeRegistry::new();
    if let Some(title) = &schema.meta.title {
        println!("\n{}", title);
    }
    println!("\n--- Fields ({}) ---", schema.len());
    for (name, field) in &schema.fields {
        let required = if field.required { "required" } else { "optional" };
        let conditional = if field.show_when.is_some() { " (conditional)" } else { "" };
        println!(
            "  [step {}] {} : {} -> {} [{}]{}",
            field.effective_step(),
            name,
            field.kind,
            registry.resolve_field(field).component,
            required,
            conditional
        );
    }
    println!("\nSteps: {:?}", schema.steps());
    println!();
}

fn run_check(definition_path: &str, values_path: &str, step: Option<u32>, naming: NamingCli) {
    let schema = load_schema(definition_path, naming);
    let values = values_from_json(&read_file(values_path, "form values"))
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid form values: {}", e)));

    let shown: Vec<&str> = match step {
        Some(step) => fields_for_step(&schema, step)
            .into_iter()
            .map(FieldDefinition::name)
            .collect(),
        None => schema.fields.keys().map(String::as_str).collect(),
    };

    println!("\n--- Visibility ---");
    for (name, verdict) in visibility(&schema, &values) {
        if !shown.contains(&name.as_str()) {
            continue;
        }
        let state = if verdict.visible { "shown " } else { "hidden" };
        match verdict.reason {
            Some(reason) => println!("  {} {} ({})", state, name, reason),
            None => println!("  {} {}", state, name),
        }
    }

    let steps: Vec<u32> = match step {
        Some(step) => vec![step],
        None => (1..=total_steps(&schema)).collect(),
    };

    println!("\n--- Validation ---");
    let mut failed = false;
    for step in steps {
        let report = validate_step(&schema, step, &values);
        if report.is_valid() {
            println!("  Step {}: ok", step);
            continue;
        }
        failed = true;
        println!("  Step {}: {} error(s)", step, report.errors.len());
        for error in &report.errors {
            println!("    -> {}", error);
        }
    }
    println!();

    if failed {
        std::process::exit(2);
    }
}

fn read_file(path: &str, what: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read {} file '{}': {}", what, path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
