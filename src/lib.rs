//! Keep go-i18n translation catalogs in sync with the source code.
//!
//! `extract` collects message literals from Go sources into the default
//! language's catalog. `merge` then reconciles each target language against
//! it: new and changed messages are queued in a staging ("todo") catalog for
//! translators, finished translations are moved into the target catalog, and
//! a signature file per target records which source text each translation
//! answers.
//!
//! # Example
//!
//! ```ignore
//! use i18n_sync::{Catalog, Message, PluralForm, Signatures, reconcile};
//!
//! let mut source = Catalog::new();
//! source.with_message(Message::new("greeting").with_form(PluralForm::Other, "Hello"));
//!
//! // First run: nothing exists yet, every entry is untranslated
//! let first = reconcile(&source, &Catalog::new(), None, &Signatures::new());
//!
//! // A translator fills in the staging catalog
//! let mut staging = first.staging.clone();
//! staging.with_message(Message::new("greeting").with_form(PluralForm::Other, "Bonjour"));
//!
//! let second = reconcile(&source, &staging, Some(&first.target), &first.signatures);
//! assert_eq!(second.target.get("greeting").unwrap().other, "Bonjour");
//! assert!(second.staging.is_empty());
//! ```

mod atomic;
pub mod config;
pub mod error;
pub mod format;
pub mod hash;
pub mod locale_dir;
pub mod merge;
pub mod message;
pub mod reconcile;
pub mod scan;
pub mod signature;


// Re-export main types for convenient access
pub use config::{Config, ConfigLayer, load_config};
pub use error::{CodecError, ConfigError, ScanError, SyncError, SyncResult};
pub use format::{Codec, Format, JsonCodec, YamlCodec};
pub use hash::{Fingerprint, fingerprint};
pub use locale_dir::LocaleDir;
pub use merge::{MergeSummary, merge};
pub use message::{Catalog, Message, PluralForm};
pub use reconcile::{BootstrapReason, Mode, Reconciliation, SyncReport, reconcile};
pub use scan::{ScanSummary, extract};
pub use signature::{SignStore, Signatures};
