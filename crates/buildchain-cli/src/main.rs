//! buildchain CLI tool.

use std::path::PathBuf;

use buildchain_core::Format;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "buildchain")]
#[command(about = "Build plan and rendered target tool", long_about = None)]
struct Cli {
    /// Path to the build plan
    #[arg(long, global = true, env = "BUILDCHAIN_PLAN", default_value = "buildplan.kdl")]
    file: PathBuf,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pipeline document for the build plan
    Plan,
    /// Validate the build plan
    Validate,
    /// List the top-level stages that start for a branch
    Stages {
        /// Branch name
        #[arg(long)]
        branch: String,
    },
    /// Render a JSON or YAML payload into a file
    Render {
        /// Payload document (.json, .yaml or .yml)
        input: PathBuf,
        /// Destination file
        output: PathBuf,
        /// Output format: json, env or yaml
        #[arg(long, short)]
        format: Format,
    },
    /// Remove a rendered file
    Clean {
        /// Rendered file to remove
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Plan => commands::plan::emit(&cli.file)?,
        Commands::Validate => commands::validate(&cli.file)?,
        Commands::Stages { branch } => commands::plan::stages(&cli.file, &branch)?,
        Commands::Render {
            input,
            output,
            format,
        } => commands::render::render(&input, &output, format)?,
        Commands::Clean { output } => commands::render::clean(&output)?,
    }

    Ok(())
}
