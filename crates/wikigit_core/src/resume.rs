use crate::RevisionRecord;

/// Why an import starts where it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    /// The caller asked for this index.
    Override,
    /// The repository has no commits yet.
    FreshRepository,
    /// A previous commit links to this revision.
    Marker { revision_id: String },
    /// Commits exist but none links to a known revision of this article.
    NoMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub start_index: usize,
    pub source: ResumeSource,
}

impl ResumePoint {
    pub fn from_override(start_index: usize) -> Self {
        Self {
            start_index,
            source: ResumeSource::Override,
        }
    }

    pub fn fresh() -> Self {
        Self {
            start_index: 0,
            source: ResumeSource::FreshRepository,
        }
    }

    /// True when every revision of a list of `total` is already committed.
    pub fn is_complete(&self, total: usize) -> bool {
        self.start_index >= total
    }
}

/// Revision id between `marker` and the next `&` in a commit message.
pub fn revision_id_after_marker<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let start = message.find(marker)? + marker.len();
    let rest = &message[start..];
    let end = rest.find('&')?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Resume point implied by the newest marked commit message.
///
/// Falls back to a full import when the message carries no marker or names a
/// revision the list does not contain; recommitting beats losing history.
pub fn resume_from_message(
    revisions: &[RevisionRecord],
    message: Option<&str>,
    marker: &str,
) -> ResumePoint {
    let located = message
        .and_then(|message| revision_id_after_marker(message, marker))
        .and_then(|id| {
            revisions
                .iter()
                .position(|revision| revision.id == id)
                .map(|index| (id, index))
        });
    match located {
        Some((id, index)) => ResumePoint {
            start_index: index + 1,
            source: ResumeSource::Marker {
                revision_id: id.to_string(),
            },
        },
        None => ResumePoint {
            start_index: 0,
            source: ResumeSource::NoMarker,
        },
    }
}
