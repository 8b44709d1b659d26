pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid document JSON: {0}")]
    DocumentJson(#[from] serde_json::Error),

    #[error("Document root must be a node object, found {found}")]
    NotANode { found: &'static str },
}
