//! Optional RON config file layered over the built-in defaults.
//!
//! Every field is optional; absent fields keep the default. Example:
//!
//! ```ron
//! (
//!     languages: Some({"fr": "https://fr.wikipedia.org/wiki/"}),
//!     batch_size: Some(500),
//!     retry_delay_ms: Some(250),
//! )
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use wikigit_core::{LanguageTable, ReflowPolicy};
use wikigit_engine::ImportSettings;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Added to (or replacing entries of) the default language table.
    pub languages: Option<BTreeMap<String, String>>,
    pub batch_size: Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub reflow: Option<ReflowPolicy>,
    pub email_domain: Option<String>,
    pub git_program: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path:?}"))?;
        ron::from_str(&content).with_context(|| format!("failed to parse config file {path:?}"))
    }

    pub fn apply(self, settings: &mut ImportSettings, languages: &mut LanguageTable) {
        for (language, base) in self.languages.into_iter().flatten() {
            languages.insert(language, base);
        }
        if let Some(batch_size) = self.batch_size {
            settings.fetch.batch_size = batch_size;
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.fetch.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.retry_attempts {
            settings.retry.attempts = attempts;
        }
        if let Some(ms) = self.retry_delay_ms {
            settings.retry.delay = Duration::from_millis(ms);
        }
        if let Some(reflow) = self.reflow {
            settings.reflow = reflow;
        }
        if let Some(domain) = self.email_domain {
            settings.email_domain = domain;
        }
        if let Some(program) = self.git_program {
            settings.git_program = program;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wikigit_core::ShellFlavor;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wikigit.ron");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn empty_config_keeps_defaults() {
        let (_temp, path) = write_config("()");
        let mut settings = ImportSettings::new(ShellFlavor::Posix);
        let mut languages = LanguageTable::default();
        AppConfig::load(&path)
            .unwrap()
            .apply(&mut settings, &mut languages);

        assert_eq!(settings.fetch.batch_size, 1000);
        assert_eq!(settings.retry.attempts, 3);
        assert_eq!(settings.email_domain, "wikipedia.org");
        assert_eq!(languages, LanguageTable::default());
    }

    #[test]
    fn fields_override_defaults() {
        let (_temp, path) = write_config(
            r#"(
                languages: Some({"fr": "https://fr.wikipedia.org/wiki/"}),
                batch_size: Some(250),
                request_timeout_secs: Some(60),
                retry_attempts: Some(5),
                retry_delay_ms: Some(10),
                reflow: Some((line_length: 120)),
                email_domain: Some("example.org"),
            )"#,
        );
        let mut settings = ImportSettings::new(ShellFlavor::Posix);
        let mut languages = LanguageTable::default();
        AppConfig::load(&path)
            .unwrap()
            .apply(&mut settings, &mut languages);

        assert_eq!(settings.fetch.batch_size, 250);
        assert_eq!(settings.fetch.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.fetch.connect_timeout, Duration::from_secs(30));
        assert_eq!(settings.retry.attempts, 5);
        assert_eq!(settings.retry.delay, Duration::from_millis(10));
        assert_eq!(settings.reflow.line_length, 120);
        assert_eq!(settings.reflow.keywords, ReflowPolicy::default().keywords);
        assert_eq!(settings.email_domain, "example.org");
        assert_eq!(
            languages.languages().collect::<Vec<_>>(),
            vec!["de", "en", "fr"]
        );
        assert!(languages.wiki("fr", "Savoir").is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let (_temp, path) = write_config("(batch_sise: Some(3))");
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.ron");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.ron"));
    }
}
