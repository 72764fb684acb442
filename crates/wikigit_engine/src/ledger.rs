use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wikigit_core::ArticleRecord;
use wikigit_logging::{wg_info, wg_warn};

use crate::persist::{AtomicFileWriter, PersistError};

pub const LEDGER_FILENAME: &str = ".wikigit_ledger.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedLedger {
    articles: Vec<ArticleRecord>,
}

/// Known articles and their import progress, keyed by canonical URL.
#[derive(Debug, Clone)]
pub struct Ledger {
    dir: PathBuf,
    articles: Vec<ArticleRecord>,
}

impl Ledger {
    /// Load the ledger in `dir`. A missing or unreadable file yields an empty
    /// ledger; it is rewritten on the next save.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(LEDGER_FILENAME);
        let empty = Self {
            dir: dir.to_path_buf(),
            articles: Vec::new(),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return empty,
            Err(err) => {
                wg_warn!("Failed to read ledger from {:?}: {}", path, err);
                return empty;
            }
        };

        match ron::from_str::<PersistedLedger>(&content) {
            Ok(state) => {
                wg_info!("Loaded {} ledger entries from {:?}", state.articles.len(), path);
                Self {
                    dir: dir.to_path_buf(),
                    articles: state.articles,
                }
            }
            Err(err) => {
                wg_warn!("Failed to parse ledger from {:?}: {}", path, err);
                empty
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&ArticleRecord> {
        self.articles.iter().find(|record| record.url == url)
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.articles
    }

    /// Insert `record` or replace the one with the same URL.
    pub fn upsert(&mut self, record: ArticleRecord) {
        match self.articles.iter_mut().find(|r| r.url == record.url) {
            Some(existing) => *existing = record,
            None => self.articles.push(record),
        }
    }

    pub fn save(&self) -> Result<PathBuf, PersistError> {
        let state = PersistedLedger {
            articles: self.articles.clone(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| PersistError::Io(std::io::Error::other(err.to_string())))?;
        AtomicFileWriter::new(self.dir.clone()).write(LEDGER_FILENAME, &content)
    }
}
