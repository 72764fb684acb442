/// Author placeholder for revisions without username or IP.
pub const NO_AUTHOR: &str = "_no_author_";
/// Author-id placeholder for revisions without numeric id or IP.
pub const NO_AUTHOR_ID: &str = "_no_authorid_";

/// One historical edit of an article, in the order the export delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRecord {
    /// Opaque identifier; unique and increasing within an article.
    pub id: String,
    /// Used verbatim as author and committer date.
    pub timestamp: String,
    pub comment: Option<String>,
    pub contributor: Contributor,
    pub segments: Vec<Segment>,
}

/// Who made a revision. Registered users carry a name and numeric id,
/// anonymous edits only an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contributor {
    pub username: Option<String>,
    pub id: Option<String>,
    pub ip: Option<String>,
}

impl Contributor {
    pub fn user(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            username: Some(name.into()),
            id: Some(id.into()),
            ip: None,
        }
    }

    pub fn anonymous(ip: impl Into<String>) -> Self {
        Self {
            username: None,
            id: None,
            ip: Some(ip.into()),
        }
    }

    /// Commit author name: sanitized username, else IP, else a placeholder.
    pub fn author_name(&self) -> String {
        self.username
            .as_deref()
            .and_then(crate::sanitize_name)
            .or_else(|| self.ip.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| NO_AUTHOR.to_string())
    }

    /// Local part of the synthesized author email: numeric id, else IP.
    pub fn author_id(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.ip.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| NO_AUTHOR_ID.to_string())
    }
}

/// One content sub-unit of a revision. `value == None` marks a segment that
/// was deleted in this revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub value: Option<String>,
}

impl Segment {
    pub fn present(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: Some(value.into()),
        }
    }

    pub fn deleted(index: usize) -> Self {
        Self { index, value: None }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}
