//! Command-line interface for elltwo
//!
//! Reads markup from a file or stdin and writes HTML, LaTeX, or the parsed
//! document tree.
//!
//! Usage:
//!   elltwo `<path>` [--to `<html|latex|json|cbor>`] [--config `<file>`] [--output `<file>`]
use clap::{Parser, ValueEnum};
use elltwo::formats::format_for;
use elltwo::{
    ElltwoError, HtmlRenderer, LatexRenderer, Render, RenderConfig, RenderContext, parse_document,
};
use log::info;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Html,
    Latex,
    Json,
    Cbor,
}

#[derive(Parser)]
#[command(name = "elltwo")]
#[command(version, about = "Render elltwo markup")]
struct Args {
    /// Markup file to read; `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Target::Html)]
    to: Target,

    /// TOML file with render settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_input(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn run(args: &Args) -> Result<Vec<u8>, ElltwoError> {
    let config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let source = read_input(args.input.as_ref())?;
    let doc = parse_document(&source)?;
    info!("parsed {} blocks", doc.len());

    let ctx = RenderContext::new(config);
    let bytes = match args.to {
        Target::Html => HtmlRenderer::new(ctx).render_document(&doc).into_bytes(),
        Target::Latex => LatexRenderer::new(ctx).render_document(&doc).into_bytes(),
        Target::Json => format_for("json-pretty")?.serialize(&doc)?,
        Target::Cbor => format_for("cbor")?.serialize(&doc)?,
    };
    Ok(bytes)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let result = run(&args).and_then(|bytes| {
        match &args.output {
            Some(path) => std::fs::write(path, &bytes)?,
            None => io::stdout().write_all(&bytes)?,
        }
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
