use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in `{}`: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid document: {0}")]
    Document(#[from] chartpress::Error),

    #[error(transparent)]
    Backend(#[from] chartpress::render::RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend returned no asset for chart `{name}`")]
    MissingAsset { name: String },

    #[error("chart `{name}` failed to render; wrote a placeholder to `{}`", path.display())]
    RenderFailed { name: String, path: PathBuf },
}
