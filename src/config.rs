//! Run configuration
//!
//! Options come from layers: built-in defaults, an optional TOML file, then
//! command-line flags. Later layers win field by field.
//!
//! ```toml
//! default = "en-US"
//! target = ["fr", "de"]
//! outdir = "locales"
//! outformat = "json"
//! path = ["cmd", "internal"]
//! ignore-test-files = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use icu_locale::Locale;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::format::Format;

pub const CONFIG_FILE_NAME: &str = "i18n-sync.toml";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_OUTDIR: &str = "./locales";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root that relative paths resolve against
    pub workspace: PathBuf,
    pub default_language: String,
    pub target_languages: Vec<String>,
    pub outdir: PathBuf,
    pub format: Format,
    /// Scan roots; empty means the whole workspace
    pub paths: Vec<PathBuf>,
    pub ignore_test_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workspace: PathBuf::from("."),
            default_language: DEFAULT_LANGUAGE.to_string(),
            target_languages: Vec::new(),
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            format: Format::default(),
            paths: Vec::new(),
            ignore_test_files: true,
        }
    }
}

impl Config {
    /// Directory holding catalogs, staging and signature files
    pub fn locale_dir(&self) -> PathBuf {
        self.workspace.join(&self.outdir)
    }

    pub fn scan_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            return vec![self.workspace.clone()];
        }
        self.paths.iter().map(|p| self.workspace.join(p)).collect()
    }

    /// Checks needed before extracting
    pub fn validate_default(&self) -> Result<(), ConfigError> {
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::MissingDefaultLanguage);
        }
        validate_language(&self.default_language)
    }

    /// Checks needed before merging
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_default()?;

        if self.target_languages.is_empty() {
            return Err(ConfigError::MissingTargetLanguages);
        }
        for target in &self.target_languages {
            validate_language(target)?;
            if target.eq_ignore_ascii_case(&self.default_language) {
                return Err(ConfigError::TargetIsDefault(target.clone()));
            }
        }
        Ok(())
    }

    /// Apply a layer on top of this configuration
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(default) = layer.default {
            self.default_language = default;
        }
        if let Some(target) = layer.target {
            self.target_languages = target;
        }
        if let Some(outdir) = layer.outdir {
            self.outdir = outdir;
        }
        if let Some(format) = layer.outformat {
            self.format = format;
        }
        if let Some(path) = layer.path {
            self.paths = path;
        }
        if let Some(ignore) = layer.ignore_test_files {
            self.ignore_test_files = ignore;
        }
    }
}

fn validate_language(code: &str) -> Result<(), ConfigError> {
    code.parse::<Locale>()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidLanguage {
            code: code.to_string(),
            reason: e.to_string(),
        })
}

/// A partial set of options, as read from a file or from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigLayer {
    pub default: Option<String>,
    pub target: Option<Vec<String>>,
    pub outdir: Option<PathBuf>,
    pub outformat: Option<Format>,
    pub path: Option<Vec<PathBuf>>,
    pub ignore_test_files: Option<bool>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Nearest ancestor of `start` (inclusive) containing `go.mod`, else `start`
pub fn find_workspace(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join("go.mod").is_file())
        .unwrap_or(start)
        .to_path_buf()
}

/// Build the configuration for a run.
///
/// # Arguments
/// * `workspace` - explicit workspace root, or `None` to search upward from
///   the current directory for `go.mod`
/// * `config_file` - explicit TOML file; when `None`, `<workspace>/i18n-sync.toml`
///   is read if it exists
/// * `cli` - options given on the command line, applied last
pub fn load_config(
    workspace: Option<PathBuf>,
    config_file: Option<PathBuf>,
    cli: ConfigLayer,
) -> Result<Config, ConfigError> {
    let workspace = match workspace {
        Some(dir) => dir,
        None => {
            let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
                path: PathBuf::from("."),
                source,
            })?;
            find_workspace(&cwd)
        }
    };

    let mut config = Config {
        workspace,
        ..Default::default()
    };

    let file = config_file.or_else(|| {
        let candidate = config.workspace.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    });
    if let Some(file) = file {
        debug!(path = %file.display(), "loading config file");
        config.apply(ConfigLayer::from_file(&file)?);
    }

    config.apply(cli);
    Ok(config)
}
