//! Source catalog producer
//!
//! Walks Go sources, extracts go-i18n message literals and writes them as the
//! default language's catalog. This is what feeds the reconciler its source
//! catalog.
//!
//! # Example
//!
//! ```ignore
//! use i18n_sync::{Config, scan};
//!
//! let config = Config { paths: vec!["cmd".into()], ..Default::default() };
//! let summary = scan::extract(&config)?;
//! println!("{} messages from {} files", summary.catalog.len(), summary.files);
//! ```

pub mod go;
pub mod literal;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ScanError;
use crate::locale_dir::LocaleDir;
use crate::message::{Catalog, Message};

pub use go::{GO_I18N_IMPORT, extract_messages};

#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of Go files parsed
    pub files: usize,
    pub catalog: Catalog,
    /// Where the catalog was written, if anything was found
    pub written: Option<PathBuf>,
}

/// Scan `paths` recursively for `.go` files and collect their messages.
pub fn scan_paths(paths: &[PathBuf], ignore_test_files: bool) -> Result<ScanSummary, ScanError> {
    let mut summary = ScanSummary::default();

    for root in paths {
        info!(path = %root.display(), "scanning");
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: root.clone(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_go_source(path, ignore_test_files) {
                continue;
            }

            let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let messages = extract_messages(path, &source)?;
            debug!(path = %path.display(), messages = messages.len(), "parsed");

            summary.files += 1;
            for message in messages {
                add_message(&mut summary.catalog, message);
            }
        }
    }

    Ok(summary)
}

/// Extract messages from the configured scan paths and write them as the
/// default language's catalog. Nothing is written when no message is found.
pub fn extract(config: &Config) -> Result<ScanSummary, ScanError> {
    config.validate_default()?;

    let mut summary = scan_paths(&config.scan_paths(), config.ignore_test_files)?;
    info!(files = summary.files, "processed files");

    if summary.catalog.is_empty() {
        info!("no messages found");
        return Ok(summary);
    }
    info!(messages = summary.catalog.len(), "found messages");

    summary.catalog.refresh_fingerprints();
    let locales = LocaleDir::new(&config.locale_dir(), config.format.codec());
    let path = locales.catalog_path(&config.default_language);
    debug!(path = %path.display(), "writing source catalog");
    locales.write_catalog(&path, &summary.catalog)?;
    summary.written = Some(path);

    Ok(summary)
}

fn is_go_source(path: &Path, ignore_test_files: bool) -> bool {
    if path.extension().and_then(|ext| ext.to_str()) != Some("go") {
        return false;
    }
    let is_test = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_test.go"));
    !(ignore_test_files && is_test)
}

// A message without text never replaces one with text under the same id.
fn add_message(catalog: &mut Catalog, message: Message) {
    if message.is_blank() && catalog.get(&message.id).is_some_and(|m| !m.is_blank()) {
        return;
    }
    catalog.insert(message);
}
