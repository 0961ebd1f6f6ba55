mod commands;
mod model;
mod reader;
mod writer;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;

use reader::{read_model_files, read_project_config};
use simpex_core::{ImpexResult, MacroTable};

const DEFAULT_OUTPUT: &str = "impex";
const DEFAULT_PROJECT_NAME: &str = "simpex";

#[derive(Parser)]
#[command(
    name = "simpex",
    version,
    about = "Simpex generator — build ImpEx import files from YAML models"
)]
struct Cli {
    /// Log model building to stderr (SIMPEX_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate ImpEx files from model files
    Generate {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (overrides the project config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write all types into one file named after the project
        #[arg(long)]
        single_file: bool,
    },

    /// Build the model and report types, columns and entries
    Check {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format: human (default) or json
        #[arg(long, default_value = "human")]
        format: String,
    },

    /// Print the header line of every type
    Headers {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Generate {
            path,
            output,
            single_file,
        } => commands::generate::run_generate(&path, output.as_deref(), single_file),
        Commands::Check { path, format } => commands::check::run_check(&path, &format),
        Commands::Headers { path } => commands::headers::run_headers(&path),
    };

    match outcome {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SIMPEX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// A built model plus where its files go.
pub struct Project {
    pub name: String,
    pub output_dir: PathBuf,
    pub result: ImpexResult,
}

pub fn build_project(input_path: &Path, output_override: Option<&Path>) -> Result<Project, String> {
    let files = read_model_files(input_path)?;
    if files.is_empty() {
        return Err(format!(
            "No model files (.simpex.yaml, .simpex.yml) found at: {}",
            input_path.display()
        ));
    }

    let config = read_project_config(input_path)?.unwrap_or_default();
    let shared = MacroTable::try_from(config.macros.clone()).map_err(|e| e.to_string())?;

    let output_dir = match (output_override, config.output.as_ref()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) => input_path.join(dir),
        (None, None) => PathBuf::from(DEFAULT_OUTPUT),
    };
    let name = config
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

    let result = model::build_result(&files, &shared, &output_dir.to_string_lossy())?;
    debug!(project = %name, types = result.types().len(), "built project");

    Ok(Project {
        name,
        output_dir,
        result,
    })
}
