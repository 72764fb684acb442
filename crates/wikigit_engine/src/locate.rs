use wikigit_core::{resume_from_message, ResumePoint, RevisionRecord};

use crate::git::GitRepository;
use crate::ImportError;

/// Where to continue importing `revisions` into `repo`.
///
/// An explicit `start_index` wins. Otherwise a repository without commits
/// starts at 0 and one with commits continues after the revision its newest
/// `marker` commit links to.
pub fn locate_resume_point(
    repo: &GitRepository<'_>,
    revisions: &[RevisionRecord],
    marker: &str,
    start_index: Option<usize>,
) -> Result<ResumePoint, ImportError> {
    if let Some(index) = start_index {
        return Ok(ResumePoint::from_override(index));
    }
    if !repo.has_commits()? {
        return Ok(ResumePoint::fresh());
    }
    let message = repo.last_message_containing(marker)?;
    Ok(resume_from_message(revisions, message.as_deref(), marker))
}
