use std::path::PathBuf;

/// Failures on the way *into* the layout engine. Once a snapshot exists,
/// nothing downstream of it can fail.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("failed to read topology snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed topology snapshot: {0}")]
    Parse(String),
    #[error("topology source unavailable: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;
