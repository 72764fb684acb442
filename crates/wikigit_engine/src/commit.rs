use wikigit_core::{ArticleWiki, RevisionRecord, ShellFlavor};

use crate::git::GitRepository;
use crate::ImportError;

/// How a commit picks up working tree changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingMode {
    /// `git add --all .` first: segment files appeared or disappeared.
    Full,
    /// `git commit --all`: the file set is unchanged, only contents moved.
    TrackedOnly,
}

/// Commits revisions of one article, one commit per revision.
///
/// Remembers the identity and segment count of the previous commit so that
/// consecutive revisions by the same author skip the config calls and an
/// unchanged file set skips the full `add`.
pub struct CommitDriver<'r> {
    repo: GitRepository<'r>,
    wiki: ArticleWiki,
    flavor: ShellFlavor,
    email_domain: String,
    last_author: Option<String>,
    last_author_id: Option<String>,
    last_segment_count: Option<usize>,
}

impl<'r> CommitDriver<'r> {
    pub fn new(
        repo: GitRepository<'r>,
        wiki: ArticleWiki,
        flavor: ShellFlavor,
        email_domain: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            wiki,
            flavor,
            email_domain: email_domain.into(),
            last_author: None,
            last_author_id: None,
            last_segment_count: None,
        }
    }

    pub fn repository(&self) -> &GitRepository<'r> {
        &self.repo
    }

    /// `<escaped comment>\n\n<canonical url>?oldid=<id>&diff=prev`
    pub fn commit_message(&self, revision: &RevisionRecord) -> String {
        format!(
            "{}\n\n{}",
            self.flavor.escape_comment(revision.comment.as_deref()),
            self.wiki.revision_link(&revision.id)
        )
    }

    pub fn staging_mode(&self, segment_count: usize) -> StagingMode {
        if self.last_segment_count == Some(segment_count) {
            StagingMode::TrackedOnly
        } else {
            StagingMode::Full
        }
    }

    /// Stage and commit the materialized `revision`.
    pub fn commit_revision(
        &mut self,
        revision: &RevisionRecord,
        segment_count: usize,
    ) -> Result<StagingMode, ImportError> {
        let staging = self.staging_mode(segment_count);
        if staging == StagingMode::Full {
            self.repo.run(self.repo.command("add").flag("--all").flag("."))?;
        }
        self.last_segment_count = Some(segment_count);

        let author = revision.contributor.author_name();
        let author_id = revision.contributor.author_id();
        let email = format!("{author_id}@{}", self.email_domain);

        if self.last_author.as_deref() != Some(author.as_str()) {
            self.repo.run(
                self.repo
                    .command("config")
                    .flag("--local")
                    .flag("user.name")
                    .value(&author),
            )?;
            self.last_author = Some(author.clone());
        }
        if self.last_author_id.as_deref() != Some(author_id.as_str()) {
            self.repo.run(
                self.repo
                    .command("config")
                    .flag("--local")
                    .flag("user.email")
                    .value(&email),
            )?;
            self.last_author_id = Some(author_id);
        }

        let mut commit = self.repo.command("commit");
        if staging == StagingMode::TrackedOnly {
            commit = commit.flag("--all");
        }
        let commit = commit
            .option("--date", &revision.timestamp)
            .option("--author", &format!("{author} <{email}>"))
            .flag("-m")
            .value(&self.commit_message(revision))
            .flag("--allow-empty")
            .env("GIT_COMMITTER_DATE", &revision.timestamp);
        self.repo.run(commit)?;
        Ok(staging)
    }
}
