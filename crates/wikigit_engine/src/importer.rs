use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::{Handle, RuntimeFlavor};
use wikigit_core::{
    file_stem, ArticleRecord, ArticleWiki, LanguageTable, ResumeSource, RevisionRecord,
};
use wikigit_logging::{wg_error, wg_info, wg_warn};

use crate::commit::CommitDriver;
use crate::export::{ExportFetcher, History};
use crate::fetch::ExportSource;
use crate::git::GitRepository;
use crate::ledger::Ledger;
use crate::locate::locate_resume_point;
use crate::materialize::ContentMaterializer;
use crate::persist::ensure_output_dir;
use crate::process::CommandRunner;
use crate::{ImportError, ImportFailure, ImportOutcome, ImportReport, ImportSettings};

/// Name of the repository directory inside an article's directory.
pub const REPOSITORY_DIR: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub article: String,
    pub language: String,
    /// Root under which `<article>/` and the ledger live.
    pub output_dir: PathBuf,
    /// Skip resume detection and start at this revision index.
    pub start_index: Option<usize>,
}

/// Runs one article import: fetch, locate, then materialize and commit each
/// remaining revision.
pub struct Importer<'a> {
    settings: &'a ImportSettings,
    languages: &'a LanguageTable,
    source: &'a dyn ExportSource,
    runner: &'a dyn CommandRunner,
    cancel: Arc<AtomicBool>,
}

/// How far a run got; survives a fatal error.
#[derive(Debug, Default)]
struct Progress {
    working_dir: PathBuf,
    revision_count: usize,
    next_index: usize,
}

impl<'a> Importer<'a> {
    pub fn new(
        settings: &'a ImportSettings,
        languages: &'a LanguageTable,
        source: &'a dyn ExportSource,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            settings,
            languages,
            source,
            runner,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Observe `flag` instead of a private one, e.g. one set by a signal
    /// handler.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Set the returned flag to stop after the revision being committed.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub async fn run(
        &self,
        request: &ImportRequest,
        ledger: &mut Ledger,
    ) -> Result<ImportOutcome, ImportFailure> {
        let mut progress = Progress {
            working_dir: request.output_dir.clone(),
            ..Progress::default()
        };
        match self.import(request, ledger, &mut progress).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                wg_error!(
                    "Import of {} failed in {:?} at index {}: {}",
                    request.article,
                    progress.working_dir,
                    progress.next_index,
                    error
                );
                Err(ImportFailure {
                    error,
                    article: request.article.clone(),
                    working_dir: progress.working_dir,
                    next_index: progress.next_index,
                    revision_count: progress.revision_count,
                })
            }
        }
    }

    async fn import(
        &self,
        request: &ImportRequest,
        ledger: &mut Ledger,
        progress: &mut Progress,
    ) -> Result<ImportOutcome, ImportError> {
        let wiki = self.languages.wiki(&request.language, &request.article)?;
        let stem = file_stem(&request.article);
        let article_dir = request.output_dir.join(&stem);
        let repo_dir = article_dir.join(REPOSITORY_DIR);
        ensure_output_dir(&repo_dir)?;
        progress.working_dir = article_dir.clone();

        wg_info!("Downloading Wikipedia article {}", request.article);
        let fetcher = ExportFetcher::new(self.source, self.settings.fetch.batch_size);
        let revisions = match fetcher.fetch_history(&wiki, &article_dir, &stem).await? {
            History::Revisions(revisions) => revisions,
            History::MissingArticle => {
                return Ok(ImportOutcome::MissingArticle {
                    article: request.article.clone(),
                })
            }
        };
        progress.revision_count = revisions.len();
        progress.working_dir = repo_dir.clone();

        let url = wiki.canonical_url();
        let mut record = ledger.get(&url).cloned().unwrap_or_else(|| {
            ArticleRecord::new(request.article.clone(), request.language.clone(), url.clone())
        });

        let result = run_blocking(|| {
            self.commit_history(request, &wiki, &stem, &repo_dir, &revisions, progress)
        });

        record.stored_revisions = revisions.len();
        record.last_import = Some(Utc::now());
        ledger.upsert(record);
        let result = match (ledger.save(), result) {
            (Ok(_), result) => result,
            (Err(err), Ok(_)) => Err(err.into()),
            (Err(err), Err(original)) => {
                wg_warn!("Failed to save ledger after failed import: {}", err);
                Err(original)
            }
        };

        result.map(|(finished, start_index)| {
            let report = ImportReport {
                article: request.article.clone(),
                canonical_url: url,
                repository: repo_dir,
                revision_count: revisions.len(),
                start_index,
                next_index: progress.next_index,
            };
            match finished {
                Finish::UpToDate => ImportOutcome::UpToDate(report),
                Finish::Completed => ImportOutcome::Completed(report),
                Finish::Cancelled => ImportOutcome::Cancelled(report),
            }
        })
    }

    fn commit_history(
        &self,
        request: &ImportRequest,
        wiki: &ArticleWiki,
        stem: &str,
        repo_dir: &Path,
        revisions: &[RevisionRecord],
        progress: &mut Progress,
    ) -> Result<(Finish, usize), ImportError> {
        let settings = self.settings;
        let repo = GitRepository::new(repo_dir, &settings.git_program, settings.shell, self.runner);
        if !repo.is_initialized() {
            repo.init()?;
        }

        let point = locate_resume_point(&repo, revisions, &wiki.revision_marker(), request.start_index)?;
        progress.next_index = point.start_index;
        match &point.source {
            ResumeSource::Marker { revision_id } => wg_info!(
                "Detected existing import. Continue after revision {} at index {}",
                revision_id,
                point.start_index
            ),
            ResumeSource::Override => wg_info!("Starting at requested index {}", point.start_index),
            ResumeSource::NoMarker => {
                wg_warn!("Repository has commits but none of {}; importing from the start", wiki.article())
            }
            ResumeSource::FreshRepository => {}
        }
        if point.is_complete(revisions.len()) {
            wg_info!("All {} revisions of {} already imported", revisions.len(), wiki.article());
            return Ok((Finish::UpToDate, point.start_index));
        }

        let materializer = ContentMaterializer::new(
            repo_dir,
            stem,
            settings.retry,
            settings.reflow.clone(),
        );
        let mut driver = CommitDriver::new(
            repo,
            wiki.clone(),
            settings.shell,
            settings.email_domain.clone(),
        );
        let interval = settings.progress_interval.max(1);

        for (index, revision) in revisions.iter().enumerate().skip(point.start_index) {
            if self.is_cancelled() {
                wg_warn!("Import of {} interrupted; resume at index {}", wiki.article(), index);
                return Ok((Finish::Cancelled, point.start_index));
            }
            if index % interval == 0 {
                wg_info!("Git importing revision {} of {}...", index, revisions.len());
            }
            let segment_count = materializer.materialize(revision)?;
            driver.commit_revision(revision, segment_count)?;
            progress.next_index = index + 1;
        }

        wg_info!("Imported {} revisions of {}", revisions.len() - point.start_index, wiki.article());
        Ok((Finish::Completed, point.start_index))
    }
}

enum Finish {
    Completed,
    UpToDate,
    Cancelled,
}

/// Git runs synchronously; on a multi-thread runtime hand the worker's other
/// tasks (the interrupt handler among them) to another thread meanwhile.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}
