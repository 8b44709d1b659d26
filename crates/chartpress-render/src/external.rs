//! Backend that shells out to the Mermaid CLI (`mmdc`).
//!
//! One scratch directory is created per batch. Each chart gets its own input/output/stderr files
//! inside it, named after the chart's stem, so no two charts ever share a path. The directory is
//! removed when the batch ends, whatever happened to the individual charts.

use crate::backend::{MimeType, RenderBackend, RenderedAsset, RenderedBatch, render_isolated};
use crate::config::{BackendKind, ExternalOutput, RenderConfig};
use crate::error::{RenderError, Result};
use crate::placeholder::{raster_placeholder, svg_placeholder};
use crate::postprocess::finalize_svg;
use chartpress_core::naming::{chart_stem, rename_extension};
use chartpress_core::{ChartItem, ChartSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDERR_TAIL_BYTES: usize = 2048;

#[derive(Debug, Clone)]
pub struct ExternalProcessBackend {
    config: RenderConfig,
}

impl ExternalProcessBackend {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn output(&self) -> ExternalOutput {
        self.config.external.output
    }

    fn placeholder(&self, item: &ChartItem) -> RenderedAsset {
        match self.output() {
            ExternalOutput::Svg => svg_placeholder(item),
            ExternalOutput::Png => raster_placeholder(item),
        }
    }

    /// Writes the optional `-c` config file shared by every chart in the batch.
    fn write_tool_config(&self, scratch: &Path) -> Result<Option<PathBuf>> {
        let Some(theme) = self.config.custom_theme() else {
            return Ok(None);
        };
        let json = theme
            .to_json()
            .map_err(|err| RenderError::ToolConfig(err.to_string()))?;
        let path = scratch.join("mermaid-config.json");
        fs::write(&path, json).map_err(|err| RenderError::ToolConfig(err.to_string()))?;
        Ok(Some(path))
    }

    fn render_item(
        &self,
        scratch: &Path,
        tool_config: Option<&Path>,
        item: &ChartItem,
    ) -> Result<RenderedAsset> {
        let stem = chart_stem(&item.name);
        let extension = match self.output() {
            ExternalOutput::Svg => MimeType::Svg.extension(),
            ExternalOutput::Png => MimeType::Png.extension(),
        };
        let input = scratch.join(format!("{stem}.mmd"));
        let output = scratch.join(format!("{stem}.{extension}"));
        let stderr = scratch.join(format!("{stem}.stderr"));

        let result = self.run_tool(&input, &output, &stderr, tool_config, item);
        for path in [&input, &output, &stderr] {
            remove_scratch_file(path);
        }
        result
    }

    fn run_tool(
        &self,
        input: &Path,
        output: &Path,
        stderr_path: &Path,
        tool_config: Option<&Path>,
        item: &ChartItem,
    ) -> Result<RenderedAsset> {
        fs::write(input, &item.source_text).map_err(|source| RenderError::Io {
            action: "write diagram source",
            path: input.to_path_buf(),
            source,
        })?;
        let stderr = File::create(stderr_path).map_err(|source| RenderError::Io {
            action: "create stderr capture",
            path: stderr_path.to_path_buf(),
            source,
        })?;

        let tool = &self.config.external;
        let mut command = Command::new(&tool.program);
        command
            .args(&tool.leading_args)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .args(["-b", "transparent", "-q"]);
        if let Some(path) = tool_config {
            command.arg("-c").arg(path);
        }
        if self.output() == ExternalOutput::Png {
            command
                .arg("-s")
                .arg(self.config.quality.scale().to_string());
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr));

        run_with_timeout(command, &tool.program_name(), tool.timeout(), stderr_path)?;

        let bytes = fs::read(output).map_err(|source| RenderError::Io {
            action: "read rendered output",
            path: output.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyOutput {
                path: output.to_path_buf(),
            });
        }

        match self.output() {
            ExternalOutput::Svg => {
                let svg = finalize_svg(&String::from_utf8(bytes)?);
                Ok(RenderedAsset::new(
                    item,
                    item.name.clone(),
                    svg.into_bytes(),
                    MimeType::Svg,
                ))
            }
            ExternalOutput::Png => Ok(RenderedAsset::new(
                item,
                rename_extension(&item.name, MimeType::Png.extension()),
                bytes,
                MimeType::Png,
            )),
        }
    }
}

impl RenderBackend for ExternalProcessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::External
    }

    fn render(&self, items: &ChartSet) -> RenderedBatch {
        if items.is_empty() {
            return RenderedBatch::default();
        }

        let scratch = tempfile::Builder::new()
            .prefix("chartpress-")
            .tempdir()
            .map_err(|err| err.to_string());
        let tool_config = match &scratch {
            Ok(dir) => self
                .write_tool_config(dir.path())
                .map_err(|err| err.to_string()),
            Err(_) => Ok(None),
        };

        let batch = render_isolated(
            self.kind(),
            items,
            |item| {
                let dir = scratch
                    .as_ref()
                    .map_err(|msg| RenderError::Scratch(msg.clone()))?;
                let config = tool_config
                    .as_ref()
                    .map_err(|msg| RenderError::ToolConfig(msg.clone()))?;
                self.render_item(dir.path(), config.as_deref(), item)
            },
            |item| self.placeholder(item),
        );

        if let Ok(dir) = scratch {
            remove_scratch_dir(dir);
        }
        batch
    }
}

/// Runs `command` to completion, killing it once `timeout` has elapsed.
fn run_with_timeout(
    mut command: Command,
    program: &str,
    timeout: Duration,
    stderr_path: &Path,
) -> Result<()> {
    // Own process group; a timeout kills wrappers such as `npx` together with their children.
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut command, 0);

    let mut child = command.spawn().map_err(|source| RenderError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    kill_tree(&mut child);
                    let _ = child.wait();
                    return Err(RenderError::Timeout {
                        program: program.to_string(),
                        secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::Io {
                    action: "wait for",
                    path: PathBuf::from(program),
                    source,
                });
            }
        }
    };

    if status.success() {
        return Ok(());
    }
    Err(RenderError::ToolFailed {
        program: program.to_string(),
        status: status.to_string(),
        stderr: stderr_tail(stderr_path),
    })
}

/// Kills `child` and, on Unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return,
            Ok(status) => tracing::debug!(%status, "kill for renderer process group failed"),
            Err(err) => tracing::debug!(error = %err, "failed to run kill for renderer process group"),
        }
    }
    if let Err(err) = child.kill() {
        tracing::debug!(error = %err, "failed to kill timed-out renderer");
    }
}

fn stderr_tail(path: &Path) -> String {
    let Ok(bytes) = fs::read(path) else {
        return String::new();
    };
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

fn remove_scratch_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove scratch file");
        }
    }
}

fn remove_scratch_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(err) = dir.close() {
        tracing::warn!(path = %path.display(), error = %err, "failed to remove scratch directory");
    }
}
