//! Signature sets and their persistence
//!
//! A signature set maps each identifier of a target catalog to the
//! fingerprint recorded when that entry was last known to be aligned with
//! the source. It is what lets the reconciler tell "a translator edited
//! this" apart from "nothing changed".
//!
//! The store's presence is meaningful: a target catalog without signatures
//! cannot be merged differentially and is bootstrapped instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic;
use crate::error::{SyncError, SyncResult};
use crate::format::Codec;
use crate::hash::Fingerprint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signatures(BTreeMap<String, Fingerprint>);

impl Signatures {
    pub fn new() -> Self {
        Signatures(BTreeMap::new())
    }

    pub fn insert(&mut self, id: &str, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.0.insert(id.to_string(), fingerprint)
    }

    pub fn get(&self, id: &str) -> Option<&Fingerprint> {
        self.0.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Fingerprint)> for Signatures {
    fn from_iter<I: IntoIterator<Item = (String, Fingerprint)>>(iter: I) -> Self {
        Signatures(iter.into_iter().collect())
    }
}

/// Persists one signature file per target language, `<dir>/<target>.sign`,
/// encoded with the same codec as the catalogs.
pub struct SignStore<'a> {
    dir: PathBuf,
    codec: &'a dyn Codec,
}

impl<'a> SignStore<'a> {
    pub fn new(dir: &Path, codec: &'a dyn Codec) -> Self {
        SignStore {
            dir: dir.to_path_buf(),
            codec,
        }
    }

    pub fn path(&self, target: &str) -> PathBuf {
        self.dir.join(format!("{target}.sign"))
    }

    /// Load the signatures of `target`. A missing or empty file yields an
    /// empty set; undecodable content is an error.
    pub fn load(&self, target: &str) -> SyncResult<Signatures> {
        let path = self.path(target);
        let Some(bytes) = atomic::read_if_exists(&path)? else {
            debug!(path = %path.display(), "no signature file");
            return Ok(Signatures::new());
        };

        self.codec
            .decode_signatures(&bytes)
            .map_err(|source| SyncError::CorruptSignatures { path, source })
    }

    /// Persist the signatures of `target`. An empty set removes the file.
    pub fn save(&self, target: &str, signatures: &Signatures) -> SyncResult<()> {
        let path = self.path(target);

        if signatures.is_empty() {
            if atomic::remove_if_exists(&path)? {
                debug!(path = %path.display(), "removed signature file");
            }
            return Ok(());
        }

        let bytes = self
            .codec
            .encode_signatures(signatures)
            .map_err(|source| SyncError::Encode {
                path: path.clone(),
                source,
            })?;
        atomic::write_atomic(&path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use std::fs;

    fn sample() -> Signatures {
        let mut signatures = Signatures::new();
        signatures.insert("greeting", Fingerprint::from("f7ff9e8b7bb2e09b70935a5d785e0cc5d9d0abf0"));
        signatures.insert("farewell", Fingerprint::from("0000"));
        signatures
    }

    #[test]
    fn test_load_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let codec = Format::Yaml.codec();
        let store = SignStore::new(dir.path(), codec.as_ref());

        assert!(store.load("fr").unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        for format in [Format::Json, Format::Yaml] {
            let codec = format.codec();
            let store = SignStore::new(dir.path(), codec.as_ref());

            store.save("fr", &sample()).unwrap();
            assert_eq!(store.load("fr").unwrap(), sample());
        }
    }

    #[test]
    fn test_save_empty_deletes_store() {
        let dir = tempfile::tempdir().unwrap();
        let codec = Format::Json.codec();
        let store = SignStore::new(dir.path(), codec.as_ref());

        store.save("fr", &sample()).unwrap();
        assert!(store.path("fr").exists());

        store.save("fr", &Signatures::new()).unwrap();
        assert!(!store.path("fr").exists());

        // Nothing to delete is fine too
        store.save("fr", &Signatures::new()).unwrap();
    }

    #[test]
    fn test_zero_byte_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let codec = Format::Yaml.codec();
        let store = SignStore::new(dir.path(), codec.as_ref());
        fs::write(store.path("de"), b"").unwrap();

        assert!(store.load("de").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let codec = Format::Json.codec();
        let store = SignStore::new(dir.path(), codec.as_ref());
        fs::write(store.path("de"), b"greeting: abc\n").unwrap();

        assert!(matches!(
            store.load("de"),
            Err(SyncError::CorruptSignatures { .. })
        ));
    }
}
