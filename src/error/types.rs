use thiserror::Error;

/// Unified result type for the navigation binding crate.
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors surfaced by the binding layer and the bundled reference collaborators.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("node `{0}` not found")]
    UnknownNode(String),
    #[error("node `{0}` already exists")]
    DuplicateNode(String),
    #[error("invalid node id `{0}`")]
    InvalidNodeId(String),
    #[error("the root node cannot be removed")]
    RootRemoval,
    #[error("{0} is already attached")]
    AlreadyAttached(&'static str),
    #[error("element `{0}` is not focusable")]
    NotFocusable(String),
    #[error("host runtime error: {0}")]
    Host(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
