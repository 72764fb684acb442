use std::path::{Path, PathBuf};

use wikigit_core::{format_file_size, ArticleWiki, RevisionRecord};
use wikigit_logging::{wg_debug, wg_info};

use crate::document::parse_export_file;
use crate::fetch::{BatchRequest, ExportSource};
use crate::ImportError;

/// Revision history as accumulated from all batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History {
    Revisions(Vec<RevisionRecord>),
    /// The export named no page for the article.
    MissingArticle,
}

/// Pages through the export endpoint, caching each batch as
/// `<stem><batch index>.xml` in `cache_dir`. Cached batches are never
/// downloaded again.
pub struct ExportFetcher<'a> {
    source: &'a dyn ExportSource,
    batch_size: usize,
}

impl<'a> ExportFetcher<'a> {
    pub fn new(source: &'a dyn ExportSource, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_path(cache_dir: &Path, stem: &str, batch_index: usize) -> PathBuf {
        cache_dir.join(format!("{stem}{batch_index}.xml"))
    }

    pub async fn fetch_history(
        &self,
        wiki: &ArticleWiki,
        cache_dir: &Path,
        stem: &str,
    ) -> Result<History, ImportError> {
        let export_url = wiki.export_url();
        let mut revisions = Vec::new();
        let mut offset: Option<String> = None;

        for batch_index in 0.. {
            let path = Self::batch_path(cache_dir, stem, batch_index);
            if path.exists() {
                wg_info!("Batch {} of {}: file {:?} already exists", batch_index, wiki.article(), path);
            } else {
                let request = BatchRequest {
                    export_url: &export_url,
                    article: wiki.article(),
                    batch_index,
                    offset: offset.as_deref(),
                };
                wg_info!(
                    "Downloading {} batch {} (offset {:?})",
                    wiki.article(),
                    batch_index,
                    offset
                );
                let bytes = self
                    .source
                    .download(&request, &path)
                    .await
                    .map_err(|source| ImportError::Download {
                        article: wiki.article().to_string(),
                        batch_index,
                        offset: offset.clone(),
                        source,
                    })?;
                wg_info!("Saved {} to {:?}", format_file_size(bytes), path);
            }

            let Some(page) = parse_export_file(&path)? else {
                wg_info!("Page {} does not exist", wiki.article());
                return Ok(History::MissingArticle);
            };

            let batch_len = page.revisions.len();
            offset = page.revisions.last().map(|r| r.timestamp.clone());
            revisions.extend(page.revisions);
            wg_debug!(
                "Batch {} held {} revisions, {} accumulated",
                batch_index,
                batch_len,
                revisions.len()
            );

            if batch_len < self.batch_size {
                break;
            }
        }

        Ok(History::Revisions(revisions))
    }
}
