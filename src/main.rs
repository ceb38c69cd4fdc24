//! FlowGate CLI Entry Point
//!
//! Provides a command-line interface for starting workflow executions.
//!
//! # Usage
//!
//! ```bash
//! # List the available templates
//! flowgate --list-templates
//!
//! # Start an execution of a built-in template
//! flowgate expense_reimbursement
//!
//! # Start with business data, inline or from a file
//! flowgate ap_invoice_processing --context '{"invoice_amount": 9000}'
//! flowgate ap_invoice_processing --context invoice.json
//!
//! # Use templates from a YAML file and persist execution records
//! flowgate my_flow --templates templates.yaml --state-dir ./state
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info};

use flowgate::capability::{CapabilityDispatcher, Context, LoggingProvider};
use flowgate::engine::Orchestrator;
use flowgate::execution::{ExecutionStatus, FileStore, WorkflowExecution};
use flowgate::template::{builtin_templates, load_templates, WorkflowTemplate};
use flowgate::{APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    template_id: Option<String>,
    template_file: Option<String>,
    context: Option<String>,
    state_dir: Option<PathBuf>,
    list_templates: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Workflow Orchestration Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: flowgate [OPTIONS] [TEMPLATE_ID]");
    println!();
    println!("Arguments:");
    println!("  [TEMPLATE_ID]       Template to start an execution of");
    println!();
    println!("Options:");
    println!("  --templates FILE    Load templates from a YAML file (default: built-in library)");
    println!("  --context JSON      Initial context, inline JSON object or a path to a JSON file");
    println!("  --state-dir PATH    Persist execution records as JSON files under PATH");
    println!("  --list-templates    List the available templates and exit");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  flowgate --list-templates");
    println!("  flowgate expense_reimbursement");
    println!("  flowgate ap_invoice_processing --context '{{\"invoice_amount\": 9000}}'");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--list-templates" => {
                config.list_templates = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--templates" => {
                i += 1;
                if i >= args.len() {
                    return Err("--templates requires a file argument".to_string());
                }
                config.template_file = Some(args[i].clone());
            }
            "--context" => {
                i += 1;
                if i >= args.len() {
                    return Err("--context requires a JSON argument".to_string());
                }
                config.context = Some(args[i].clone());
            }
            "--state-dir" => {
                i += 1;
                if i >= args.len() {
                    return Err("--state-dir requires a path argument".to_string());
                }
                config.state_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.template_id.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.template_id = Some(arg.clone());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Parses the `--context` value: an inline JSON object, or a path to a file
/// containing one.
fn parse_context(raw: &str) -> Result<Context, Box<dyn std::error::Error>> {
    let json = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw)
            .map_err(|e| format!("Could not read context file '{}': {}", raw, e))?
    };

    let context: Context = serde_json::from_str(&json)
        .map_err(|e| format!("Context must be a JSON object: {}", e))?;
    Ok(context)
}

/// Prints a summary of the loaded templates.
fn print_templates(templates: &[WorkflowTemplate]) {
    println!("Available templates:");
    println!();
    for template in templates {
        println!("  {} - {} [{}]", template.id, template.name, template.category);
        println!(
            "      {} steps, {} checkpoints, trigger: {}",
            template.step_count(),
            template.checkpoints.len(),
            template.trigger.description
        );
    }
    println!();
}

/// Prints the final snapshot of an execution.
fn print_execution(execution: &WorkflowExecution) {
    println!();
    println!("Execution:  {}", execution.id);
    println!("Template:   {}", execution.template_id);
    println!("Status:     {}", execution.status);
    println!("Step:       {}", execution.current_step);

    if execution.status == ExecutionStatus::Paused {
        let pending: Vec<&str> = execution
            .pending_checkpoints()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        println!("Awaiting:   {}", pending.join(", "));
    }

    if let Some(reason) = &execution.failure_reason {
        println!("Failure:    {}", reason);
    }

    match serde_json::to_string_pretty(&execution.context) {
        Ok(json) => println!("Context:    {}", json),
        Err(e) => println!("Context:    <unserializable: {}>", e),
    }
    println!();
}

/// Main application entry point.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    // Print banner
    print_banner();

    // Load templates
    let templates = match &config.template_file {
        Some(path) => {
            info!("Loading templates: {}", path);
            load_templates(path).map_err(|e| {
                error!("Failed to load templates: {}", e);
                format!("Could not load templates from '{}': {}", path, e)
            })?
        }
        None => builtin_templates(),
    };
    info!("Loaded {} templates", templates.len());

    if config.list_templates {
        print_templates(&templates);
        return Ok(());
    }

    let Some(template_id) = config.template_id else {
        return Err("No template id given (try --list-templates)".into());
    };

    // Wire a logging provider for every distinct step action
    let mut dispatcher = CapabilityDispatcher::new();
    for template in &templates {
        for step in &template.steps {
            if !dispatcher.resolves(&step.action) {
                dispatcher.register(&step.action, LoggingProvider)?;
            }
        }
    }

    let mut orchestrator = Orchestrator::new(dispatcher);
    if let Some(dir) = &config.state_dir {
        orchestrator = orchestrator.with_durable_store(Arc::new(FileStore::new(dir.clone())));
    }
    for template in templates {
        orchestrator.register_template(template)?;
    }

    if config.state_dir.is_some() {
        let restored = orchestrator.restore().await?;
        if restored > 0 {
            info!("Restored {} previous execution records", restored);
        }
    }

    // Parse initial context
    let context = match &config.context {
        Some(raw) => parse_context(raw)?,
        None => Context::new(),
    };

    // Start the execution and print where it landed
    let id = orchestrator.start_workflow(&template_id, context).await?;
    let execution = orchestrator.execution(&id)?;
    print_execution(&execution);

    if execution.status == ExecutionStatus::Paused {
        info!("Execution paused; a checkpoint decision is required to continue");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
