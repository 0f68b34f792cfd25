//! Error type shared by the config store, context injector, and tree writer.

use std::path::{Path, PathBuf};

/// Errors raised while resolving configuration or materializing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Filesystem access failed.
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A YAML document could not be parsed or emitted.
    #[error("YAML error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A JSON config document could not be parsed or emitted.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The user explicitly named a config file that does not exist.
    ///
    /// There is no configuration to continue with; a CLI should report this
    /// and stop rather than fall back to defaults.
    #[error("user specified config file {} doesn't exist", .path.display())]
    MissingUserConfig { path: PathBuf },

    /// A paired-data line did not contain exactly two entries.
    #[error("{}:{line_no}: line must contain exactly two entries: {line:?}", .path.display())]
    MalformedPairLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    /// A tree node's stem or namespace cannot be used as an output name.
    #[error("invalid tree node '{node}': {message}")]
    InvalidTree { node: String, message: String },

    /// A supplementary inputs document had the wrong shape.
    #[error("invalid inputs file {}: {message}", .path.display())]
    InvalidInputs { path: PathBuf, message: String },
}

impl EmitError {
    /// Build an `Io` mapper for `map_err`.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }

    /// Build a `Yaml` mapper for `map_err`.
    pub fn yaml(path: impl AsRef<Path>) -> impl FnOnce(serde_yaml_ng::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Yaml { path, source }
    }

    /// Build a `Json` mapper for `map_err`.
    pub fn json(path: impl AsRef<Path>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Json { path, source }
    }

    /// True for errors that should end a CLI run without attempting recovery.
    pub fn is_fatal_user_error(&self) -> bool {
        matches!(self, Self::MissingUserConfig { .. })
    }
}
