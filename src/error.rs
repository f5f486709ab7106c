use crate::explorer::Side;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while fetching and decoding a contract's verified source from one explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The request could not be completed: connection, DNS, timeout, or a non-2xx status.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    /// The response body is not shaped like `{ "result": [ { "SourceCode": "..." } ] }`.
    #[error("unexpected response: {0}")]
    ResponseFormat(String),

    /// The `SourceCode` field is not a JSON object with a `sources` mapping.
    #[error("invalid source code: {0}")]
    SourceParse(String),
}

impl ExplorerError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExplorerError::Network(_) => "NetworkError",
            ExplorerError::ResponseFormat(_) => "ResponseFormatError",
            ExplorerError::SourceParse(_) => "SourceParseError",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{side} explorer: {source}")]
    Explorer {
        side: Side,
        #[source]
        source: ExplorerError,
    },

    /// A dump from a previous run has not been cleaned up.
    #[error("{} already exists; inspect and remove it before re-running", path.display())]
    FileExists { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// The operator-facing name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Explorer { source, .. } => source.kind(),
            Error::FileExists { .. } => "FileExistsError",
            Error::Io(_) => "IoError",
            Error::Serialize(_) => "SerializeError",
        }
    }
}
