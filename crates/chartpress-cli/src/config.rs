//! Configuration file loading and flag overrides.

use crate::args::Options;
use crate::error::CliError;
use chartpress::render::{RenderConfig, ThemeConfig};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ASSETS_DIR: &str = "chartpress-assets";
pub const DEFAULT_COLLECTION: &str = "chartpress";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub collection: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

/// Everything a command needs, after merging file and flags.
///
/// ```toml
/// backend = "external"
/// quality = "high"
///
/// [theme]
/// theme = "dark"
///
/// [external]
/// program = "npx"
/// leading-args = ["-y", "@mermaid-js/mermaid-cli"]
/// timeout-secs = 60
///
/// [upload]
/// dir = "assets"
/// collection = "team-space"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub render: RenderConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Loads the file named by `--config` (if any), then applies the remaining flags.
    pub fn resolve(options: &Options) -> Result<Self, CliError> {
        let mut config = match &options.config {
            Some(path) => load_config_file(path)?,
            None => {
                debug!("No configuration file given, using defaults");
                Self::default()
            }
        };
        config.apply(options);
        Ok(config)
    }

    pub fn apply(&mut self, options: &Options) {
        let render = &mut self.render;
        if let Some(backend) = options.backend {
            render.backend = backend;
        }
        if let Some(quality) = options.quality {
            render.quality = quality;
        }
        if let Some(format) = options.raster_format {
            render.raster_format = format;
        }
        if let Some(theme) = &options.theme {
            // Keep file-provided variables when only the name changes.
            match &mut render.theme {
                Some(existing) => existing.theme = theme.clone(),
                None => render.theme = Some(ThemeConfig::named(theme.clone())),
            }
        }
        if let Some(program) = &options.mmdc {
            render.external.program = program.clone();
        }
        if let Some(secs) = options.timeout_secs {
            render.external.timeout_secs = secs;
        }
        if let Some(dir) = &options.assets_dir {
            self.upload.dir = dir.clone();
        }
        if let Some(collection) = &options.collection {
            self.upload.collection = collection.clone();
        }
    }
}

fn load_config_file(path: &Path) -> Result<AppConfig, CliError> {
    info!(path = path.display().to_string(); "Loading configuration");
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|err| CliError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
