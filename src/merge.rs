use tracing::{error, info};

use crate::config::Config;
use crate::error::{ConfigError, SyncError};
use crate::locale_dir::LocaleDir;
use crate::reconcile::SyncReport;

/// Outcome of a merge over all target languages
#[derive(Debug, Default)]
pub struct MergeSummary {
    pub results: Vec<(String, Result<SyncReport, SyncError>)>,
}

impl MergeSummary {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SyncError)> {
        self.results.iter().filter_map(|(lang, result)| match result {
            Err(e) => Some((lang.as_str(), e)),
            Ok(_) => None,
        })
    }

    pub fn report(&self, lang: &str) -> Option<&SyncReport> {
        self.results
            .iter()
            .find(|(l, _)| l == lang)
            .and_then(|(_, result)| result.as_ref().ok())
    }
}

/// Reconcile every target language of `config` against the default
/// language's catalog.
///
/// Configuration errors abort before anything is touched. After that each
/// target is independent: a failure is logged and recorded, and the
/// remaining targets still run.
pub fn merge(config: &Config) -> Result<MergeSummary, ConfigError> {
    config.validate()?;

    let locales = LocaleDir::new(&config.locale_dir(), config.format.codec());
    let mut summary = MergeSummary::default();

    for target in &config.target_languages {
        let result = locales.sync_target(&config.default_language, target);
        match &result {
            Ok(report) => info!(lang = %target, "{}", report),
            Err(e) => error!(lang = %target, error = %e, "merge failed"),
        }
        summary.results.push((target.clone(), result));
    }

    Ok(summary)
}
