use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wikigit_core::ConfigError;

use crate::persist::PersistError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Writing the downloaded body to the cache failed.
    Cache,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Cache => write!(f, "cache write error"),
        }
    }
}

/// Fatal import errors. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed download for {article} at batch {batch_index} (offset {offset:?}): {source}")]
    Download {
        article: String,
        batch_index: usize,
        offset: Option<String>,
        #[source]
        source: FetchError,
    },
    #[error("{operation} failed after {attempts} attempts: {source}")]
    TransientIo {
        operation: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` failed in {working_dir:?} ({status})\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    ExternalCommand {
        command: String,
        working_dir: PathBuf,
        status: String,
        stdout: String,
        stderr: String,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("export file {path:?} is malformed: {message}")]
    MalformedExport { path: PathBuf, message: String },
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A fatal error together with where the import stood when it happened.
#[derive(Debug, Error)]
#[error("import of {article} failed in {working_dir:?} (resume at index {next_index}): {error}")]
pub struct ImportFailure {
    #[source]
    pub error: ImportError,
    pub article: String,
    pub working_dir: PathBuf,
    /// Index of the first revision not yet committed.
    pub next_index: usize,
    pub revision_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub article: String,
    pub canonical_url: String,
    pub repository: PathBuf,
    pub revision_count: usize,
    pub start_index: usize,
    /// Index of the first revision not yet committed.
    pub next_index: usize,
}

impl ImportReport {
    pub fn committed(&self) -> usize {
        self.next_index.saturating_sub(self.start_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every remaining revision was committed in this run.
    Completed(ImportReport),
    /// A previous run already committed every revision.
    UpToDate(ImportReport),
    /// The export contained no page; nothing to import.
    MissingArticle { article: String },
    /// Interrupted between revisions.
    Cancelled(ImportReport),
}
