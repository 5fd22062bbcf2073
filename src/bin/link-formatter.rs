//! link-formatter - reformat pasted HTML for link-less platforms

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use link_formatter::{FormatOptions, FormattedOutput, Formatter, MarkupScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// Plain text with reference markers
    Plain,
    /// Plain text with blank lines collapsed
    Compact,
    /// Footnote-rewritten markup
    Markup,
    /// All three, separated by headers
    All,
    /// All outputs and the reference table as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "link-formatter")]
#[command(version, about = "Reformat pasted HTML for platforms without links", long_about = None)]
#[command(after_help = "EXAMPLES:
    link-formatter post.html                  Print plain text with [n] markers
    link-formatter -o compact post.html       Print text with single newlines
    pbpaste -Prefer html | link-formatter -o markup --body-only")]
struct Cli {
    /// Input HTML file (reads stdin when omitted or `-`)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// MIME type of the input, used for charset detection
    #[arg(long, value_name = "TYPE")]
    mime_type: Option<String>,

    /// Output to print
    #[arg(short, long, value_enum, default_value_t = OutputKind::Plain)]
    output: OutputKind,

    /// Keep <meta> tags and inline style attributes
    #[arg(long)]
    keep_metadata: bool,

    /// Append a "References:" list to the plain text
    #[arg(short, long)]
    references: bool,

    /// Write only the children of <body> as markup
    #[arg(long)]
    body_only: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let input = read_input(cli.input.as_deref())?;
    tracing::info!(bytes = input.len(), "read input");

    let formatter = Formatter::with_options(FormatOptions {
        strip_metadata: !cli.keep_metadata,
        append_reference_list: cli.references,
        markup_scope: if cli.body_only {
            MarkupScope::Body
        } else {
            MarkupScope::Document
        },
        ..Default::default()
    });

    let output = formatter
        .format_bytes(&input, cli.mime_type.as_deref())
        .map_err(|e| e.to_string())?;

    print_output(&output, cli.output)
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>, String> {
    match path {
        None | Some("-") => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(buffer)
        }
        Some(path) => fs::read(path).map_err(|e| format!("failed to read {path}: {e}")),
    }
}

fn print_output(output: &FormattedOutput, kind: OutputKind) -> Result<(), String> {
    match kind {
        OutputKind::Plain => println!("{}", output.plain_text),
        OutputKind::Compact => println!("{}", output.compact_text),
        OutputKind::Markup => println!("{}", output.markup),
        OutputKind::All => {
            println!("--- plain ---\n{}", output.plain_text);
            println!("--- compact ---\n{}", output.compact_text);
            println!("--- markup ---\n{}", output.markup);
        }
        OutputKind::Json => {
            let references: Vec<_> = output
                .references
                .iter()
                .map(|(id, content)| json!({ "id": id, "content": content }))
                .collect();
            let value = json!({
                "plain_text": output.plain_text,
                "compact_text": output.compact_text,
                "markup": output.markup,
                "references": references,
            });
            let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
            println!("{text}");
        }
    }
    Ok(())
}
