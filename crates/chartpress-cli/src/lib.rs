//! CLI logic for chartpress.

pub mod args;
pub mod config;
pub mod error;

pub use args::{Args, Command, Options};
pub use config::AppConfig;
pub use error::CliError;

use chartpress::render::{RenderBackend, build_backend};
use chartpress::{ChartItem, ChartSet, DirectoryUploader, DocumentNode, Publisher, extract};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const STDIN: &str = "-";

/// Runs one command to completion.
pub fn run(args: &Args) -> Result<(), CliError> {
    let options = &args.options;
    match &args.command {
        Command::Extract { input } => {
            let tree = read_document(input)?;
            let charts = extract(&tree);
            info!(charts = charts.len(); "Extracted charts");
            write_json(&charts, options.out.as_deref())
        }
        Command::Publish { input } => {
            let config = AppConfig::resolve(options)?;
            let tree = read_document(input)?;
            let backend = build_backend(config.render)?;
            let uploader = DirectoryUploader::new(config.upload.dir, config.upload.collection);
            let outcome = Publisher::new(backend, uploader).publish(&tree);

            let report = outcome.report;
            info!(
                charts = report.charts,
                placeholders = report.placeholders,
                uploaded = report.uploaded,
                skipped = report.skipped,
                rewritten = report.rewritten;
                "Published document"
            );
            write_json(&outcome.tree, options.out.as_deref())
        }
        Command::Render { input } => {
            let config = AppConfig::resolve(options)?;
            let source = read_input(input)?;
            let backend = build_backend(config.render)?;
            render_one(backend.as_ref(), &source, options.out.as_deref())
        }
    }
}

fn render_one(
    backend: &dyn RenderBackend,
    source: &str,
    out: Option<&Path>,
) -> Result<(), CliError> {
    let item = ChartItem::new(source);
    let charts: ChartSet = [item.clone()].into_iter().collect();
    let batch = backend.render(&charts);
    let Some(asset) = batch.into_iter().next() else {
        return Err(CliError::MissingAsset { name: item.name });
    };

    let path = out.map_or_else(|| PathBuf::from(&asset.file_name), Path::to_path_buf);
    fs::write(&path, &asset.bytes).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;

    if asset.is_placeholder {
        warn!(name = asset.name.as_str(); "Chart failed to render");
        return Err(CliError::RenderFailed {
            name: asset.name,
            path,
        });
    }
    info!(path = path.display().to_string(), mime = asset.mime_type.as_str(); "Rendered chart");
    println!("{}", path.display());
    Ok(())
}

fn read_input(input: &Path) -> Result<String, CliError> {
    if input.as_os_str() == STDIN {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })
}

fn read_document(input: &Path) -> Result<DocumentNode, CliError> {
    Ok(DocumentNode::from_json_str(&read_input(input)?)?)
}

fn write_json(value: &impl Serialize, out: Option<&Path>) -> Result<(), CliError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    match out {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
