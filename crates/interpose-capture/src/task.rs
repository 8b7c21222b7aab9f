//! Units of work for the capture worker.

use interpose_core::DataBag;
use std::path::{Path, PathBuf};

/// Which side of an invocation a capture holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Input,
    Output,
}

impl CaptureKind {
    /// File name suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            CaptureKind::Input => "input",
            CaptureKind::Output => "output",
        }
    }
}

/// A bag to persist, with where to put it. Queued once, consumed once.
#[derive(Debug, Clone)]
pub struct CaptureTask {
    directory: PathBuf,
    file_name: String,
    contents: DataBag,
}

impl CaptureTask {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>, contents: DataBag) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            contents,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn contents(&self) -> &DataBag {
        &self.contents
    }

    /// Full path of the capture file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// Identifies the capture files of one invocation.
///
/// Rendered as `{host}_{processStart}_{sequence}_{invocationStart}_{service}`,
/// times in epoch milliseconds; [`FileStem::file_name`] appends the side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStem(String);

impl FileStem {
    pub fn new(
        host: &str,
        process_start_millis: u64,
        sequence: u64,
        invocation_start_millis: u64,
        service: &str,
    ) -> Self {
        Self(format!(
            "{}_{}_{}_{}_{}",
            sanitize(host),
            process_start_millis,
            sequence,
            invocation_start_millis,
            sanitize(service)
        ))
    }

    /// File name for one side of the invocation.
    pub fn file_name(&self, kind: CaptureKind) -> String {
        format!("{}_{}", self.0, kind.suffix())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
