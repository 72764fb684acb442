use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigError;

/// Progress record for one imported article, keyed by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub name: String,
    pub language: String,
    pub url: String,
    pub last_import: Option<DateTime<Utc>>,
    pub stored_revisions: usize,
}

impl ArticleRecord {
    pub fn new(name: impl Into<String>, language: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            url: url.into(),
            last_import: None,
            stored_revisions: 0,
        }
    }
}

/// Language code to wiki base URL (ending in `/wiki/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTable {
    bases: BTreeMap<String, String>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        let mut bases = BTreeMap::new();
        bases.insert("de".to_string(), "https://de.wikipedia.org/wiki/".to_string());
        bases.insert("en".to_string(), "https://en.wikipedia.org/wiki/".to_string());
        Self { bases }
    }
}

impl LanguageTable {
    pub fn new(bases: BTreeMap<String, String>) -> Self {
        Self { bases }
    }

    pub fn insert(&mut self, language: impl Into<String>, base: impl Into<String>) {
        self.bases.insert(language.into(), base.into());
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.bases.keys().map(String::as_str)
    }

    /// Resolve the wiki of `language` for `article`.
    pub fn wiki(&self, language: &str, article: &str) -> Result<ArticleWiki, ConfigError> {
        let base = self
            .bases
            .get(language)
            .ok_or_else(|| ConfigError::UnsupportedLanguage {
                language: language.to_string(),
                available: self.languages().collect::<Vec<_>>().join(", "),
            })?;
        let parsed = Url::parse(base).map_err(|err| ConfigError::InvalidBaseUrl {
            language: language.to_string(),
            message: err.to_string(),
        })?;
        Ok(ArticleWiki {
            base: parsed,
            article: article.to_string(),
        })
    }
}

/// The URLs derived from one (language, article) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleWiki {
    base: Url,
    article: String,
}

impl ArticleWiki {
    pub fn article(&self) -> &str {
        &self.article
    }

    /// `<base>Special:Export`, the endpoint batches are posted to.
    pub fn export_url(&self) -> String {
        format!("{}Special:Export", self.base)
    }

    /// `<base><article>`, the identity key in the ledger.
    pub fn canonical_url(&self) -> String {
        format!("{}{}", self.base, self.article)
    }

    /// Prefix every commit message link starts with; the revision id follows.
    pub fn revision_marker(&self) -> String {
        format!("{}?oldid=", self.canonical_url())
    }

    pub fn revision_link(&self, revision_id: &str) -> String {
        format!("{}{}&diff=prev", self.revision_marker(), revision_id)
    }
}
