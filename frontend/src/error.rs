use std::path::PathBuf;

/// Everything that can stop the `ale` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] ale_interface::Error),

    #[error("{path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("`{0}` is neither a cartridge file nor a game with a bundled image")]
    UnknownCartridge(String),

    #[error("JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CliError::File { path, source }
    }
}
