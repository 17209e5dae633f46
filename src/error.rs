use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparkError {
    #[error("cannot read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    MalformedTable(String),

    /// Every sample was flagged, so there is no anchor to interpolate from.
    #[error("every sample was flagged as a spike, nothing left to interpolate from")]
    InsufficientReferenceData,

    #[error("cannot write {}: {reason}", .path.display())]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SparkError>;
