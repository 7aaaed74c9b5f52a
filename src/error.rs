//! Error types for extraction and catalog synchronization

use std::path::PathBuf;

/// Configuration problems. These abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("default language is empty")]
    MissingDefaultLanguage,

    #[error("no target languages given")]
    MissingTargetLanguages,

    #[error("invalid language code '{code}': {reason}")]
    InvalidLanguage { code: String, reason: String },

    #[error("target language '{0}' is the default language")]
    TargetIsDefault(String),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures of a catalog or signature codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures while reconciling a single target language.
///
/// Missing staging or signature files are not errors; they are part of the
/// normal flow and select the bootstrap path instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("source catalog not found: {0}")]
    SourceMissing(PathBuf),

    #[error("unreadable catalog '{path}': {source}")]
    CorruptCatalog {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("unreadable signature file '{path}': {source}")]
    CorruptSignatures {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("failed to encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while scanning source files for message literals
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to load the Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("failed to parse '{0}'")]
    Parse(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for synchronization of one target
pub type SyncResult<T> = Result<T, SyncError>;
