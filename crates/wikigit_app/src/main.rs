//! `wikigit`: import the revision history of a wiki article into a git
//! repository, one commit per revision.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use wikigit_core::LanguageTable;
use wikigit_engine::{
    ensure_output_dir, ImportFailure, ImportOutcome, ImportRequest, ImportSettings, Importer,
    Ledger, ReqwestExportSource, ShellRunner,
};
use wikigit_logging::{wg_error, wg_warn, LogOptions};

use crate::config::AppConfig;

const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "wikigit")]
#[command(about = "Import the revision history of a wiki article into a git repository")]
#[command(version)]
struct Cli {
    /// Article title as it appears in the wiki URL, e.g. `Rust_(programming_language)`.
    article: String,

    /// Language code of the wiki to import from.
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Directory holding per-article caches, repositories and the ledger.
    #[arg(short, long, default_value = "wikigit-output")]
    output_dir: PathBuf,

    /// Start at this revision index instead of continuing after the last
    /// imported revision.
    #[arg(long)]
    start_index: Option<usize>,

    /// RON file overriding languages, batch size, timeouts, retries and reflow.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    wikigit_logging::initialize(&LogOptions {
        level: if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        file: cli.log_file.clone(),
    });

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            wg_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = ImportSettings::for_host()?;
    let mut languages = LanguageTable::default();
    if let Some(path) = &cli.config {
        AppConfig::load(path)?.apply(&mut settings, &mut languages);
    }
    ensure_output_dir(&cli.output_dir)
        .with_context(|| format!("cannot use output directory {:?}", cli.output_dir))?;

    let source = ReqwestExportSource::new(&settings.fetch)?;
    let runner = ShellRunner::new(settings.shell);
    let cancel = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(cancel.clone());

    let importer =
        Importer::new(&settings, &languages, &source, &runner).with_cancel(cancel.clone());
    let mut ledger = Ledger::load(&cli.output_dir);
    let request = ImportRequest {
        article: cli.article,
        language: cli.language,
        output_dir: cli.output_dir,
        start_index: cli.start_index,
    };

    match importer.run(&request, &mut ledger).await {
        Ok(outcome) => Ok(report_outcome(&outcome)),
        Err(failure) => {
            report_failure(&failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn spawn_interrupt_handler(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            wg_warn!("Interrupt received; stopping after the current revision");
            flag.store(true, Ordering::SeqCst);
        }
    });
}

fn report_outcome(outcome: &ImportOutcome) -> ExitCode {
    match outcome {
        ImportOutcome::Completed(report) => {
            println!(
                "Imported {} of {} revisions of {} into {}",
                report.committed(),
                report.revision_count,
                report.article,
                report.repository.display()
            );
            ExitCode::SUCCESS
        }
        ImportOutcome::UpToDate(report) => {
            println!(
                "{} is up to date ({} revisions in {})",
                report.article,
                report.revision_count,
                report.repository.display()
            );
            ExitCode::SUCCESS
        }
        ImportOutcome::MissingArticle { article } => {
            println!("Article {article} does not exist; nothing imported");
            ExitCode::SUCCESS
        }
        ImportOutcome::Cancelled(report) => {
            println!(
                "Interrupted after {} revisions of {}; the next run resumes at index {}",
                report.committed(),
                report.article,
                report.next_index
            );
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

fn report_failure(failure: &ImportFailure) {
    eprintln!("error: {}", failure.error);
    eprintln!("  article:           {}", failure.article);
    eprintln!("  working directory: {}", failure.working_dir.display());
    eprintln!(
        "  resume index:      {} of {} revisions",
        failure.next_index, failure.revision_count
    );
}
