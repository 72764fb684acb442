//! Wikigit core: revision model and the pure text transforms of an import.
mod article;
mod error;
mod reflow;
mod resume;
mod revision;
mod sanitize;
mod size;

pub use article::{ArticleRecord, ArticleWiki, LanguageTable};
pub use error::ConfigError;
pub use reflow::{reflow, render_lines, Reflow, ReflowLine, ReflowPolicy, Separator};
pub use resume::{resume_from_message, revision_id_after_marker, ResumePoint, ResumeSource};
pub use revision::{Contributor, RevisionRecord, Segment, NO_AUTHOR, NO_AUTHOR_ID};
pub use sanitize::{file_stem, sanitize_name, ShellFlavor};
pub use size::format_file_size;
