//! redoc CLI - apply the house formatting policy to Word documents
//!
//! A command-line front end for formatting `.docx` files in place or to a
//! new file next to the original.

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use redoc::{PackageTransformer, PartReport, PartStatus, TransformReport};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Apply a fixed formatting policy to Word documents
#[derive(Parser)]
#[command(
    name = "redoc",
    author = "iyulab",
    version,
    about = "Normalize fonts, spacing and margins of Word documents",
    long_about = "redoc - rewrite a .docx package to a fixed house style.\n\n\
                  Sets Times New Roman 12pt with 1.15 line spacing, fixed heading sizes\n\
                  and one-inch page margins. Everything else in the package is kept as is."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a document and write the result
    #[command(visible_alias = "fmt")]
    Format {
        /// Input .docx file
        input: PathBuf,

        /// Output file path (default: <name>.formatted.docx next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the transformation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what formatting would change, without writing anything
    Inspect {
        /// Input .docx file
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Format {
            input,
            output,
            json,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let pb = create_spinner("Formatting document...");

            let transformed = read_input(&input)
                .and_then(|data| PackageTransformer::new().transform(&data));
            pb.finish_and_clear();
            let transformed = transformed?;

            fs::write(&output, &transformed.bytes)?;
            log::info!("wrote {} ({} bytes)", output.display(), transformed.bytes.len());

            if json {
                println!("{}", serde_json::to_string_pretty(&transformed.report)?);
            } else {
                println!(
                    "{} Formatted document: {}",
                    "✓".green().bold(),
                    output.display()
                );
                print_report(&transformed.report);
            }
        }

        Commands::Inspect { input, json } => {
            let pb = create_spinner("Analyzing document...");

            let transformed = read_input(&input)
                .and_then(|data| PackageTransformer::new().transform(&data));
            pb.finish_and_clear();
            let report = transformed?.report;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", "Formatting Preview".cyan().bold());
                println!("{}", "─".repeat(40));
                println!(
                    "{}: {}",
                    "File".bold(),
                    input.file_name().unwrap_or_default().to_string_lossy()
                );
                println!(
                    "{}: {}",
                    "Output name".bold(),
                    redoc::formatted_file_name(&input.to_string_lossy())
                );
                println!("{}: {}", "Content type".bold(), redoc::DOCX_MIME_TYPE);
                print_report(&report);
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// A path that does not exist counts as no input at all.
fn read_input(path: &Path) -> redoc::Result<Vec<u8>> {
    match fs::read(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist", path.display());
            Err(redoc::Error::InputMissing)
        }
        other => other.map_err(redoc::Error::from),
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(redoc::formatted_file_name(&input.to_string_lossy()))
}

fn print_report(report: &TransformReport) {
    println!("{}: {}", "Entries".bold(), report.entries);
    println!("{}: {}", "Styles".bold(), describe_part(&report.styles));
    if !report.normalized_styles.is_empty() {
        println!(
            "{}: {}",
            "Normalized".bold(),
            report.normalized_styles.join(", ")
        );
    }
    let mut document = describe_part(&report.document);
    if report.section_created {
        document.push_str(", section properties added");
    }
    println!("{}: {}", "Document".bold(), document);
}

fn describe_part(part: &PartReport) -> String {
    let status = match part.status {
        PartStatus::Rewritten => "rewritten".green().to_string(),
        PartStatus::Missing => "not present".yellow().to_string(),
        PartStatus::Empty => "empty, left as is".yellow().to_string(),
        PartStatus::Skipped => "unexpected root, left as is".yellow().to_string(),
    };
    format!("{} ({})", part.path, status)
}

fn print_version() {
    println!("{} {}", "redoc".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Apply a fixed formatting policy to Word documents");
    println!();
    println!("Supported formats: DOCX");
    println!("Repository: https://github.com/iyulab/redoc");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
