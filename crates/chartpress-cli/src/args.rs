//! Command-line arguments.

use chartpress::render::{BackendKind, Quality, RasterFormat};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Render Mermaid code blocks in a JSON document tree and rewrite them as media nodes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub options: Options,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the distinct charts of a document as JSON.
    Extract {
        /// Document JSON file, or `-` for stdin.
        input: PathBuf,
    },
    /// Render, store and rewrite every chart of a document.
    Publish {
        /// Document JSON file, or `-` for stdin.
        input: PathBuf,
    },
    /// Render a single Mermaid file.
    Render {
        /// Mermaid source file, or `-` for stdin.
        input: PathBuf,
    },
}

/// Settings shared by every command. Anything given here overrides the config file.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Options {
    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Render backend: external, embedded or canvas.
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Raster quality: low, medium or high.
    #[arg(long, global = true)]
    pub quality: Option<Quality>,

    /// Raster format for the canvas backend: png or jpg.
    #[arg(long, global = true)]
    pub raster_format: Option<RasterFormat>,

    /// Mermaid theme name, e.g. `dark` or `forest`.
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Mermaid CLI executable used by the external backend.
    #[arg(long, global = true)]
    pub mmdc: Option<PathBuf>,

    /// Per-chart time limit for the external backend.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Directory rendered assets are stored in.
    #[arg(long, global = true)]
    pub assets_dir: Option<PathBuf>,

    /// Collection id recorded on stored assets.
    #[arg(long, global = true)]
    pub collection: Option<String>,

    /// Output file. Defaults to stdout for JSON and to the asset's name for `render`.
    #[arg(short, long, global = true)]
    pub out: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}
