//! Index caption files and run queries against them.
//!
//! Usage:
//!     capsearch --index talk=talk.en.vtt --index intro=intro.srt --phrase "hello world"
//!     capsearch --index talk=talk.en.vtt --words "hel wor" --variant chars
//!
//! Prints a JSON report with each index outcome, index stats and query results.

use anyhow::{anyhow, Context, Result};
use capsearch::tracing_setup::{init_tracing, level_from_env, parse_level};
use capsearch::{
    CaptionIndex, CaptionIndexApi, DocIds, Health, IndexConfig, IndexOutcome, IndexStats,
    StagedUpload, Variant,
};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Caption file to index, as DOC_ID=PATH (repeatable)
    #[arg(short, long = "index", value_name = "DOC_ID=PATH")]
    index: Vec<String>,

    /// Exact phrase query
    #[arg(short, long)]
    phrase: Option<String>,

    /// Prefix intersection query
    #[arg(short, long)]
    words: Option<String>,

    /// Index variant: tokens, chars or both (defaults to the config value)
    #[arg(short, long)]
    variant: Option<Variant>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for capsearch events (RUST_LOG overrides)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct Report {
    health: Health,
    indexed: Vec<IndexOutcome>,
    stats: IndexStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    phrase_matches: Option<DocIds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_matches: Option<DocIds>,
}

fn parse_index_arg(arg: &str) -> Result<(&str, &Path)> {
    let (doc_id, path) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected DOC_ID=PATH, got '{}'", arg))?;
    Ok((doc_id, Path::new(path)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match &args.log_level {
        Some(raw) => parse_level(raw).ok_or_else(|| anyhow!("unknown log level '{}'", raw))?,
        None => level_from_env(Level::WARN),
    };
    init_tracing(level);

    let config = match &args.config {
        Some(path) => IndexConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => IndexConfig::default(),
    };
    let config = config
        .with_env_overrides()
        .context("Invalid environment override")?;
    let variant = args.variant.unwrap_or(config.default_variant);
    let index = CaptionIndex::new(config);

    let mut indexed = Vec::with_capacity(args.index.len());
    for arg in &args.index {
        let (doc_id, path) = parse_index_arg(arg)?;
        let upload = StagedUpload::from_path(doc_id, path)
            .with_context(|| format!("Rejected {}", path.display()))?;
        let (doc_id, lines) = upload.into_parts();
        indexed.push(index.index(doc_id, lines, variant).await?);
    }

    let report = Report {
        health: index.health(),
        stats: index.stats(),
        indexed,
        phrase_matches: args.phrase.as_deref().map(|q| index.query_phrase(q)),
        word_matches: args.words.as_deref().map(|q| index.query_intersection(q)),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
