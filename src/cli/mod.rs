//! CLI module for the news aggregator
//!
//! Subcommands:
//! - `serve`: HTTP API plus periodic ingestion
//! - `api`: HTTP API only
//! - `ingest`: one ingestion pass, then exit
//! - `migrate`: apply the database schema

pub mod api;
pub mod ingest;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// News aggregator - multi-provider ingestion with fuzzy deduplication
#[derive(Parser)]
#[command(name = "news-aggregator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API and the ingestion scheduler (default mode)
    Serve,

    /// Run the HTTP API only
    Api,

    /// Fetch from providers once and exit
    Ingest(ingest::IngestArgs),

    /// Apply pending schema migrations and exit
    Migrate,
}
