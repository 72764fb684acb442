mod common;

use std::path::PathBuf;

use common::RecordingRunner;
use pretty_assertions::assert_eq;
use wikigit_core::{Contributor, LanguageTable, RevisionRecord, Segment, ShellFlavor};
use wikigit_engine::{
    locate_resume_point, CommitDriver, GitRepository, ImportError, StagingMode,
};

const MARKER: &str = "https://de.wikipedia.org/wiki/Wissen?oldid=";

fn revision(id: &str, comment: Option<&str>, contributor: Contributor) -> RevisionRecord {
    RevisionRecord {
        id: id.to_string(),
        timestamp: "2003-05-01T10:00:00Z".to_string(),
        comment: comment.map(str::to_string),
        contributor,
        segments: vec![Segment::present(0, "text")],
    }
}

fn driver(runner: &RecordingRunner) -> CommitDriver<'_> {
    let wiki = LanguageTable::default().wiki("de", "Wissen").unwrap();
    let repo = GitRepository::new("/work/Wissen/git", "git", ShellFlavor::Posix, runner);
    CommitDriver::new(repo, wiki, ShellFlavor::Posix, "wikipedia.org")
}

#[test]
fn first_commit_stages_everything_and_sets_identity() {
    let runner = RecordingRunner::default();
    let mut driver = driver(&runner);

    let staging = driver
        .commit_revision(&revision("100", Some("start"), Contributor::user("Anna", "17")), 1)
        .unwrap();
    assert_eq!(staging, StagingMode::Full);

    let calls = runner.take();
    let lines: Vec<_> = calls.iter().map(|c| c.command_line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "add --all .",
            r#"config --local user.name "Anna""#,
            r#"config --local user.email "17@wikipedia.org""#,
            "commit --date=\"2003-05-01T10:00:00Z\" --author=\"Anna <17@wikipedia.org>\" \
             -m \"start\n\nhttps://de.wikipedia.org/wiki/Wissen?oldid=100&diff=prev\" --allow-empty",
        ]
    );
    let commit = &calls[3];
    assert_eq!(commit.program, "git");
    assert_eq!(commit.working_dir, PathBuf::from("/work/Wissen/git"));
    assert_eq!(
        commit.env,
        vec![("GIT_COMMITTER_DATE".to_string(), "2003-05-01T10:00:00Z".to_string())]
    );
}

#[test]
fn same_author_and_file_count_skip_redundant_calls() {
    let runner = RecordingRunner::default();
    let mut driver = driver(&runner);
    let author = Contributor::user("Anna", "17");

    driver.commit_revision(&revision("100", None, author.clone()), 2).unwrap();
    runner.take();

    let staging = driver.commit_revision(&revision("101", None, author), 2).unwrap();
    assert_eq!(staging, StagingMode::TrackedOnly);
    let lines = runner.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("commit --all --date="));
}

#[test]
fn changed_segment_count_forces_full_add() {
    let runner = RecordingRunner::default();
    let mut driver = driver(&runner);
    let author = Contributor::user("Anna", "17");

    driver.commit_revision(&revision("100", None, author.clone()), 2).unwrap();
    runner.take();

    let staging = driver.commit_revision(&revision("101", None, author), 1).unwrap();
    assert_eq!(staging, StagingMode::Full);
    let lines = runner.lines();
    assert_eq!(lines[0], "add --all .");
    assert!(lines[1].starts_with("commit --date="));
}

#[test]
fn identity_changes_are_configured_separately() {
    let runner = RecordingRunner::default();
    let mut driver = driver(&runner);

    driver
        .commit_revision(&revision("100", None, Contributor::user("Anna", "17")), 1)
        .unwrap();
    runner.take();
    driver
        .commit_revision(&revision("101", None, Contributor::anonymous("192.0.2.9")), 1)
        .unwrap();

    let lines = runner.lines();
    assert_eq!(
        &lines[..2],
        &[
            r#"config --local user.name "192.0.2.9""#.to_string(),
            r#"config --local user.email "192.0.2.9@wikipedia.org""#.to_string(),
        ]
    );
}

#[test]
fn comment_is_escaped_in_message() {
    let runner = RecordingRunner::default();
    let driver = driver(&runner);
    let message = driver.commit_message(&revision(
        "100",
        Some(r#"revert "spam" & (test)"#),
        Contributor::user("Anna", "17"),
    ));
    assert_eq!(
        message,
        "revert \\\"spam\\\" \\& \\(test\\)\n\nhttps://de.wikipedia.org/wiki/Wissen?oldid=100&diff=prev"
    );
}

#[test]
fn failing_commit_reports_output_and_directory() {
    let runner = RecordingRunner::failing_on("commit");
    let mut driver = driver(&runner);

    let err = driver
        .commit_revision(&revision("100", None, Contributor::user("Anna", "17")), 1)
        .unwrap_err();
    match err {
        ImportError::ExternalCommand {
            command,
            working_dir,
            status,
            stdout,
            stderr,
        } => {
            assert!(command.starts_with("git commit"));
            assert_eq!(working_dir, PathBuf::from("/work/Wissen/git"));
            assert_eq!(status, "exit code 1");
            assert_eq!(stdout, "partial output");
            assert_eq!(stderr, "fatal: something broke");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

fn revisions(ids: &[&str]) -> Vec<RevisionRecord> {
    ids.iter()
        .map(|id| revision(id, None, Contributor::user("Anna", "17")))
        .collect()
}

#[test]
fn explicit_start_index_skips_repository_queries() {
    let runner = RecordingRunner::default();
    let repo = GitRepository::new("/work", "git", ShellFlavor::Posix, &runner);
    let point = locate_resume_point(&repo, &revisions(&["1", "2"]), MARKER, Some(7)).unwrap();
    assert_eq!(point.start_index, 7);
    assert!(runner.lines().is_empty());
}

#[test]
fn repository_without_commits_starts_at_zero() {
    let runner = RecordingRunner::failing_on("rev-parse");
    let repo = GitRepository::new("/work", "git", ShellFlavor::Posix, &runner);
    let point = locate_resume_point(&repo, &revisions(&["1", "2"]), MARKER, None).unwrap();
    assert_eq!(point.start_index, 0);
    assert_eq!(runner.lines(), vec!["rev-parse --verify --quiet HEAD"]);
}

#[test]
fn resumes_after_revision_named_in_last_marked_commit() {
    let runner = RecordingRunner::default();
    runner.respond("log", &format!("typo\n\n{MARKER}2&diff=prev\n"));
    let repo = GitRepository::new("/work", "git", ShellFlavor::Posix, &runner);

    let point = locate_resume_point(&repo, &revisions(&["1", "2", "3"]), MARKER, None).unwrap();
    assert_eq!(point.start_index, 2);
    assert_eq!(
        runner.lines()[1],
        format!("log -1 --fixed-strings --grep=\"{MARKER}\" --format=%B")
    );
}
