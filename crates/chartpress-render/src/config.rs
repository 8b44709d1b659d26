//! Immutable render configuration, built once per publish run and cloned into a backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which render backend a publish run uses. Chosen statically; nothing probes for availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Spawns the Mermaid CLI (`mmdc`) once per chart.
    #[default]
    External,
    /// Renders SVG in-process through an embedded Mermaid library.
    Embedded,
    /// Renders SVG in-process, then rasterizes it on an off-screen surface.
    Canvas,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Embedded => "embedded",
            Self::Canvas => "canvas",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" | "mmdc" => Ok(Self::External),
            "embedded" => Ok(Self::Embedded),
            "canvas" => Ok(Self::Canvas),
            other => Err(format!(
                "unknown backend `{other}` (expected external, embedded or canvas)"
            )),
        }
    }
}

/// Raster quality, expressed as a multiple of the diagram's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub fn scale(self) -> f32 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 1.5,
            Self::High => 2.0,
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown quality `{other}` (expected low, medium or high)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(format!("unknown raster format `{other}` (expected png or jpg)")),
        }
    }
}

/// Mermaid theme selection, serialized as the `{theme, themeVariables}` object Mermaid expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub theme: String,
    #[serde(
        rename = "themeVariables",
        alias = "theme-variables",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub theme_variables: Map<String, Value>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::named("default")
    }
}

impl ThemeConfig {
    pub fn named(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            theme_variables: Map::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.theme_variables.insert(key.into(), value.into());
        self
    }

    /// Mermaid's own default: nothing needs to be passed to the renderer.
    pub fn is_default(&self) -> bool {
        self.theme == "default" && self.theme_variables.is_empty()
    }

    /// JSON config file contents for the Mermaid CLI (`-c`).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// `%%{init: ...}%%` directive carrying the theme inside the diagram source.
    pub fn init_directive(&self) -> serde_json::Result<String> {
        Ok(format!("%%{{init: {}}}%%", self.to_json()?))
    }
}

/// Format the external tool is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalOutput {
    #[default]
    Svg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExternalToolConfig {
    /// Program to run, e.g. `mmdc` or `npx`.
    pub program: PathBuf,
    /// Arguments placed before the render flags, e.g. `["-y", "@mermaid-js/mermaid-cli"]`.
    pub leading_args: Vec<String>,
    pub output: ExternalOutput,
    /// Upper bound for a single invocation.
    pub timeout_secs: u64,
}

impl Default for ExternalToolConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("mmdc"),
            leading_args: Vec::new(),
            output: ExternalOutput::Svg,
            timeout_secs: 30,
        }
    }
}

impl ExternalToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    pub backend: BackendKind,
    pub theme: Option<ThemeConfig>,
    pub quality: Quality,
    pub raster_format: RasterFormat,
    pub external: ExternalToolConfig,
}

impl RenderConfig {
    /// The configured theme, unless it is Mermaid's default.
    pub fn custom_theme(&self) -> Option<&ThemeConfig> {
        self.theme.as_ref().filter(|theme| !theme.is_default())
    }

    /// Diagram source as handed to an in-process engine, with the theme directive prepended.
    pub fn prepare_source(&self, source: &str) -> String {
        match self.custom_theme().map(ThemeConfig::init_directive) {
            Some(Ok(directive)) => format!("{directive}\n{source}"),
            Some(Err(err)) => {
                tracing::warn!(error = %err, "failed to serialize theme; rendering without it");
                source.to_string()
            }
            None => source.to_string(),
        }
    }
}
