//! Form Check CLI
//!
//! Lints form definitions, previews defaults, runs submissions against
//! sample values and exports definitions.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use form_schemas::form::check_definition;
use form_schemas::{
    generate_default_values, FormLinter, FormSchema, FormSession, FormValues, FormsConfig, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "form-check")]
#[command(about = "Lint, preview and exercise dynamic form definitions")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report problems in a form definition
    Lint {
        /// Form definition (JSON)
        schema: PathBuf,
    },

    /// Print the default values of a form
    Defaults {
        /// Form definition (JSON)
        schema: PathBuf,
    },

    /// Submit sample values through a form session
    Validate {
        /// Form definition (JSON)
        schema: PathBuf,
        /// Values to submit (JSON object)
        values: PathBuf,
    },

    /// Export a form definition
    Export {
        /// Form definition (JSON)
        schema: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::JsonSchema)]
        format: ExportFormat,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// JSON Schema of valid submissions
    JsonSchema,
    /// Graphviz DOT of condition dependencies
    Dot,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration as TOML
    Show,
    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "forms.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the command succeeded
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = FormsConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Lint { schema } => {
            let content = std::fs::read_to_string(&schema)?;
            let document: serde_json::Value = serde_json::from_str(&content)?;
            check_definition(&document)?;
            // lint without the structural check so every problem is listed
            let form: FormSchema = serde_json::from_value(document)?;
            let result = FormLinter::new().lint(&form);

            for error in &result.errors {
                println!("❌ {} {}: {}", error.code, error.path, error.message);
            }
            for warning in &result.warnings {
                println!("⚠️  {} {}: {}", warning.code, warning.path, warning.message);
            }
            if result.is_clean() && !result.has_warnings() {
                println!("✅ {} - no problems found", result.form_id);
            }
            Ok(result.is_clean())
        }

        Commands::Defaults { schema } => {
            let form = FormSchema::from_path(&schema)?;
            let defaults = generate_default_values(&form.fields, None);
            println!("{}", serde_json::to_string_pretty(&defaults)?);
            Ok(true)
        }

        Commands::Validate { schema, values } => {
            let form = FormSchema::from_path(&schema)?;
            let values = read_values(&values)?;

            let mut session = FormSession::new(form, None, &config)?;
            session.set_values(&values);

            let visible: Vec<&str> = session.visible_field_ids().iter().map(String::as_str).collect();
            println!("👁  Visible fields: {}", visible.join(", "));

            match session.begin_submit()? {
                SubmitOutcome::Submitted(payload) => {
                    session.finish_submit();
                    println!("✅ Valid submission:");
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                    Ok(true)
                }
                SubmitOutcome::Invalid(errors) => {
                    println!("❌ {} field(s) failed validation:", errors.len());
                    for error in errors.iter() {
                        println!("   └─ {}: {}", error.field_id, error.message);
                    }
                    Ok(false)
                }
            }
        }

        Commands::Export { schema, format, output } => {
            let form = FormSchema::from_path(&schema)?;
            let content = match format {
                ExportFormat::JsonSchema => serde_json::to_string_pretty(&form.to_json_schema(&config.validation))?,
                ExportFormat::Dot => form.dependency_graph().to_dot(),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &content)?;
                    println!("✅ Exported to: {:?}", path);
                }
                None => println!("{}", content),
            }
            Ok(true)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show => println!("{}", toml::to_string_pretty(&config)?),
                ConfigAction::Init { output } => {
                    FormsConfig::default().save(&output)?;
                    println!("✅ Created config file: {}", output);
                }
            }
            Ok(true)
        }
    }
}

fn read_values(path: &Path) -> anyhow::Result<FormValues> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<serde_json::Value>(&content)? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("values must be a JSON object, got {}", other),
    }
}
