//! Wikigit engine: the IO side of an import.
mod commit;
mod document;
mod export;
mod fetch;
mod git;
mod importer;
mod ledger;
mod locate;
mod materialize;
mod persist;
mod process;
mod retry;
mod settings;
mod types;

pub use commit::{CommitDriver, StagingMode};
pub use document::{parse_export, parse_export_file, DocumentError, ExportPage};
pub use export::{ExportFetcher, History};
pub use fetch::{BatchRequest, ExportSource, ReqwestExportSource, EDIT_TOKEN_PLACEHOLDER};
pub use git::{GitCommand, GitRepository};
pub use importer::{ImportRequest, Importer, REPOSITORY_DIR};
pub use ledger::{Ledger, LEDGER_FILENAME};
pub use locate::locate_resume_point;
pub use materialize::ContentMaterializer;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use process::{CommandOutput, CommandRunner, Invocation, ShellRunner};
pub use retry::RetryPolicy;
pub use settings::{FetchSettings, ImportSettings};
pub use types::{
    FailureKind, FetchError, ImportError, ImportFailure, ImportOutcome, ImportReport,
};
