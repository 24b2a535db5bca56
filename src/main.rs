//! typegen — generate typed code from rendered documentation pages.
//!
//! Three modes:
//!
//! - `typegen types -l rust page.html` — type declarations from tables
//! - `typegen endpoints -l rust page.html` — endpoint URL builders
//! - `typegen pmo page.md` — expand pmo code fences into tables
//!
//! Each mode reads stdin when no files are given.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use typegen::endpoint::{create_endpoint_generator, tokenize_route};
use typegen::generate::create_generator;
use typegen::{dom, pmo, tokenizer};

#[derive(Parser)]
#[command(
    name = "typegen",
    about = "Generate typed code from rendered documentation tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate type declarations from the tables in rendered HTML pages.
    Types {
        /// Target language: typescript, python, rust, or go
        #[arg(short = 'l', long, default_value = "typescript")]
        lang: String,

        /// Input files (glob patterns supported). If omitted, reads stdin.
        files: Vec<String>,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Generate endpoint URL builders from route headers in rendered HTML pages.
    Endpoints {
        /// Target language: typescript, rust, or python
        #[arg(short = 'l', long, default_value = "typescript")]
        lang: String,

        /// Input files (glob patterns supported). If omitted, reads stdin.
        files: Vec<String>,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Expand pmo code fences in markdown documents into documentation tables.
    Pmo {
        /// Input files (glob patterns supported). If omitted, reads stdin.
        files: Vec<String>,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Types {
            lang,
            files,
            output,
        } => run_types(&lang, &files, output.as_deref()),
        Command::Endpoints {
            lang,
            files,
            output,
        } => run_endpoints(&lang, &files, output.as_deref()),
        Command::Pmo { files, output } => run_pmo(&files, output.as_deref()),
    }
}

fn run_types(lang: &str, files: &[String], output: Option<&Path>) -> Result<()> {
    let generator = create_generator(lang)?;
    let mut out = String::new();

    for (source, content) in read_inputs(files)? {
        let doc = dom::parse_document(&content);
        let tables = dom::find_elements(&doc, "table");
        if tables.is_empty() {
            eprintln!("warning: no tables found in {source}");
        }

        for table in tables {
            let mut warnings = Vec::new();
            match tokenizer::tokenize(table, &mut warnings) {
                Some(data) => out.push_str(&generator.generate(&data)),
                None => eprintln!("warning: failed to generate code for a table in {source}"),
            }
            for warning in warnings {
                eprintln!("warning: {warning} ({source})");
            }
        }
    }

    write_output(output, &out)
}

fn run_endpoints(lang: &str, files: &[String], output: Option<&Path>) -> Result<()> {
    let generator = create_endpoint_generator(lang)?;
    let mut out = String::new();

    for (source, content) in read_inputs(files)? {
        let doc = dom::parse_document(&content);
        let headers = dom::find_elements(&doc, "routeheader");
        if headers.is_empty() {
            eprintln!("warning: no route headers found in {source}");
        }

        for header in headers {
            let mut warnings = Vec::new();
            match tokenize_route(header, &mut warnings) {
                Some(data) => {
                    out.push_str(&generator.generate(&data));
                    out.push('\n');
                }
                None => eprintln!("warning: failed to generate code for a route in {source}"),
            }
            for warning in warnings {
                eprintln!("warning: {warning} ({source})");
            }
        }
    }

    write_output(output, &out)
}

fn run_pmo(files: &[String], output: Option<&Path>) -> Result<()> {
    let mut out = String::new();

    for (source, content) in read_inputs(files)? {
        let expanded = pmo::expand_document(&content)
            .with_context(|| format!("failed to expand pmo blocks in {source}"))?;
        out.push_str(&expanded);
    }

    write_output(output, &out)
}

/// Read all inputs as `(display name, content)` pairs; stdin when no files.
fn read_inputs(files: &[String]) -> Result<Vec<(String, String)>> {
    if files.is_empty() {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(vec![("<stdin>".to_string(), input)]);
    }

    let mut inputs = Vec::new();
    for path in expand_globs(files)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        inputs.push((path.to_string_lossy().to_string(), content));
    }
    Ok(inputs)
}

/// Expand glob patterns into a sorted, deduplicated list of file paths.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {pattern}"))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {pattern}");
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
