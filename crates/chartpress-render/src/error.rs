use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Failure of a single chart (or of batch setup shared by every chart).
///
/// Backends convert these into placeholder assets; they never escape [`crate::RenderBackend::render`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create scratch directory: {0}")]
    Scratch(String),

    #[error("failed to write renderer config: {0}")]
    ToolConfig(String),

    #[error("failed to {action} `{}`: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("`{program}` exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("renderer produced an empty file at `{}`", path.display())]
    EmptyOutput { path: PathBuf },

    #[error("rendered SVG is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("diagram engine failed: {0}")]
    Engine(String),

    #[error("failed to parse SVG: {0}")]
    SvgParse(String),

    #[error("failed to allocate a {width}x{height} surface")]
    SurfaceAlloc { width: u32, height: u32 },

    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("the `{feature}` feature is required for the {backend} backend")]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
    },
}
