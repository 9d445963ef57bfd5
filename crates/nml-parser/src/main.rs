/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Developer binary: parse an NML file and dump the resulting tree.
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nml_parser::{Engine, NmlConfig, Renderer, TextRenderer};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented tree dump
    Text,
    /// The whole document as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "nml-dump")]
#[command(about = "Parse an NML file and print its syntax tree")]
struct Cli {
    /// The NML file to parse
    input: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: Format,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nml=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading config '{}'", path.display()))?;
            NmlConfig::from_toml_str(&source)
                .with_context(|| format!("parsing config '{}'", path.display()))?
        }
        None => NmlConfig::default(),
    };

    let engine = Engine::new().with_config(config.parser);
    let doc = match engine.parse_file(&cli.input) {
        Ok(doc) => doc,
        Err(err) => {
            let diagnostic = err.diagnostic();
            let rendered = diagnostic
                .to_ariadne_text()
                .unwrap_or_else(|| diagnostic.to_text());
            eprintln!("{}", rendered);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        Format::Text => {
            TextRenderer.render(&doc, &config.render, &mut out)?;
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
