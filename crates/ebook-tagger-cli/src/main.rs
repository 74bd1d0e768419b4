// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command-line interface for the e-book tagger
//!
//! Usage:
//!   ebook-tagger convert `<file.docx>` [-o `<path>`] [-f text|json] [--stdout] [-c `<settings.toml>`]
//!   ebook-tagger inspect `<file.docx>`

mod commands;
mod settings;
mod upload;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CommandError, OutputFormat};
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ebook-tagger")]
#[command(about = "Convert tagged DOCX manuscripts into e-book interaction text")]
#[command(version)]
struct Cli {
    /// Log conversion details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a .docx file into `<name>.txt` or `<name>-contentHTML.json`
    Convert {
        input: PathBuf,

        /// Output file, or directory receiving the default file name
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print the result instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Settings file
        #[arg(short, long, value_name = "TOML")]
        config: Option<PathBuf>,
    },

    /// Print the loaded paragraphs and runs as JSON
    Inspect {
        input: PathBuf,

        /// Settings file
        #[arg(short, long, value_name = "TOML")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<CommandError>()
                .map_or(1, CommandError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            input,
            output,
            format,
            stdout,
            config,
        } => {
            let settings = Settings::load(config.as_deref())?;
            let result = commands::convert_document(&input, &settings, format)?;
            if stdout {
                println!("{}", result.content);
            } else {
                let path = commands::output_path(&input, output.as_deref(), &result.output_name);
                commands::save_result(&result, &path)?;
                println!("{}", path.display());
            }
        }
        Commands::Inspect { input, config } => {
            let settings = Settings::load(config.as_deref())?;
            println!("{}", commands::inspect_document(&input, &settings.upload)?);
        }
    }
    Ok(())
}
