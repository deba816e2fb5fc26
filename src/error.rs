use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("save slot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode saved game: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode game state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("save version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}
