use std::fs;
use std::path::{Path, PathBuf};

use wikigit_core::{render_lines, ReflowPolicy, RevisionRecord};

use crate::retry::RetryPolicy;
use crate::ImportError;

/// Writes a revision's segments into the working tree as `<stem><n>`.
pub struct ContentMaterializer {
    dir: PathBuf,
    stem: String,
    retry: RetryPolicy,
    reflow: ReflowPolicy,
}

impl ContentMaterializer {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, retry: RetryPolicy, reflow: ReflowPolicy) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            retry,
            reflow,
        }
    }

    pub fn segment_path(&self, number: usize) -> PathBuf {
        self.dir.join(format!("{}{}", self.stem, number))
    }

    /// Replace the segment files with those of `revision`.
    ///
    /// Deleted segments do not use up a number, so the files are always
    /// `<stem>0..<stem>{count-1}`. Returns that count.
    pub fn materialize(&self, revision: &RevisionRecord) -> Result<usize, ImportError> {
        self.retry.run(
            &format!("cleanup of {:?} for revision {}", self.dir, revision.id),
            || remove_files_with_prefix(&self.dir, &self.stem),
        )?;

        let mut count = 0;
        for segment in &revision.segments {
            let Some(value) = segment.value.as_deref() else {
                continue;
            };
            let path = self.segment_path(count);
            let content = render_lines(value, &self.reflow);
            self.retry
                .run(&format!("write of {path:?}"), || fs::write(&path, &content))?;
            count += 1;
        }
        Ok(count)
    }
}

fn remove_files_with_prefix(dir: &Path, prefix: &str) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
