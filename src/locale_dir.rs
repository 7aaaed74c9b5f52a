//! Catalog files of one locale directory
//!
//! Layout, for a format with extension `ext`:
//!
//! | file | content |
//! |---|---|
//! | `<lang>.<ext>` | catalog of a language (the default language's is the source) |
//! | `<target>.todo.<ext>` | staging catalog of a target language |
//! | `<target>.sign` | signatures of a target catalog, same encoding as catalogs |
//!
//! Everything for a target is read, reconciled in memory, and only then
//! written back, each file atomically. Signatures are written first and
//! staging last, so an edit is only consumed once the target holds it.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::atomic;
use crate::error::{SyncError, SyncResult};
use crate::format::Codec;
use crate::message::Catalog;
use crate::reconcile::{self, Mode, SyncReport};
use crate::signature::{SignStore, Signatures};

pub struct LocaleDir {
    root: PathBuf,
    codec: Box<dyn Codec>,
}

impl LocaleDir {
    pub fn new(root: &Path, codec: Box<dyn Codec>) -> Self {
        LocaleDir {
            root: root.to_path_buf(),
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self, lang: &str) -> PathBuf {
        self.root.join(format!("{lang}.{}", self.codec.extension()))
    }

    pub fn staging_path(&self, target: &str) -> PathBuf {
        self.root
            .join(format!("{target}.todo.{}", self.codec.extension()))
    }

    pub fn sign_store(&self) -> SignStore<'_> {
        SignStore::new(&self.root, self.codec.as_ref())
    }

    /// Load the source catalog with fingerprints computed from content
    pub fn load_source(&self, lang: &str) -> SyncResult<Catalog> {
        let path = self.catalog_path(lang);
        let Some(bytes) = atomic::read_if_exists(&path)? else {
            return Err(SyncError::SourceMissing(path));
        };
        let mut catalog = self
            .codec
            .decode_catalog(&bytes)
            .map_err(|source| SyncError::CorruptCatalog { path, source })?;
        catalog.refresh_fingerprints();
        Ok(catalog)
    }

    /// Load the staging catalog of `target`.
    ///
    /// Staging is working memory only: a missing file is an empty catalog,
    /// and an unreadable one is logged and treated as empty.
    pub fn load_staging(&self, target: &str) -> SyncResult<Catalog> {
        let path = self.staging_path(target);
        let Some(bytes) = atomic::read_if_exists(&path)? else {
            debug!(path = %path.display(), "no staging file");
            return Ok(Catalog::new());
        };
        let mut catalog = match self.codec.decode_catalog(&bytes) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable staging file");
                Catalog::new()
            }
        };
        catalog.refresh_fingerprints();
        Ok(catalog)
    }

    /// Load the target catalog, `None` if it does not exist yet.
    ///
    /// Fingerprints are left unset; they come from the signature set.
    pub fn load_target(&self, target: &str) -> SyncResult<Option<Catalog>> {
        let path = self.catalog_path(target);
        let Some(bytes) = atomic::read_if_exists(&path)? else {
            debug!(path = %path.display(), "no target catalog");
            return Ok(None);
        };
        self.codec
            .decode_catalog(&bytes)
            .map(Some)
            .map_err(|source| SyncError::CorruptCatalog { path, source })
    }

    pub fn load_signatures(&self, target: &str) -> SyncResult<Signatures> {
        self.sign_store().load(target)
    }

    pub fn write_catalog(&self, path: &Path, catalog: &Catalog) -> SyncResult<()> {
        let bytes = self
            .codec
            .encode_catalog(catalog)
            .map_err(|source| SyncError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        atomic::write_atomic(path, &bytes)
    }

    /// Reconcile `target` against the catalog of `default` and write the
    /// results back.
    pub fn sync_target(&self, default: &str, target: &str) -> SyncResult<SyncReport> {
        let source = self.load_source(default)?;
        if source.is_empty() {
            info!(lang = target, "source catalog is empty, nothing to do");
            return Ok(SyncReport::default());
        }

        let staging = self.load_staging(target)?;
        let current = self.load_target(target)?;
        let signatures = match &current {
            Some(catalog) if !catalog.is_empty() => self.load_signatures(target)?,
            _ => Signatures::new(),
        };

        let result = reconcile::reconcile(&source, &staging, current.as_ref(), &signatures);
        if result.report.is_noop() {
            return Ok(result.report);
        }
        if let Mode::Bootstrap(reason) = result.report.mode {
            debug!(lang = target, ?reason, "bootstrapping from source catalog");
        }

        // Signatures, then target, then staging: a run cut short after any
        // step re-derives the same decisions on the next run.
        self.sign_store().save(target, &result.signatures)?;
        self.write_catalog(&self.catalog_path(target), &result.target)?;

        let staging_path = self.staging_path(target);
        if result.staging.is_empty() {
            if atomic::remove_if_exists(&staging_path)? {
                debug!(path = %staging_path.display(), "removed empty staging file");
            }
        } else {
            self.write_catalog(&staging_path, &result.staging)?;
        }

        Ok(result.report)
    }
}
