//! File manager data types: workspace paths and directory entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::PathError;

/// Position inside a process's file tree.
///
/// Either the null path (no directory chosen yet, shows the top-level
/// directory picker) or a "/"-joined list of non-empty segments relative to
/// the process root. Segments never contain "/".
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkspacePath {
    segments: Vec<String>,
}

impl WorkspacePath {
    /// The null path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a "/"-joined path. Leading and trailing slashes are ignored;
    /// an empty string yields the null path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append one segment.
    pub fn join(&self, name: &str) -> Result<Self, PathError> {
        if name.is_empty() {
            return Err(PathError::EmptySegment);
        }
        if name.contains('/') {
            return Err(PathError::Separator(name.to_string()));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// The containing directory. A top-level directory's parent is the null path.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Last segment, if any.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Query-string form; `None` for the null path.
    pub fn as_query(&self) -> Option<String> {
        (!self.is_root()).then(|| self.to_string())
    }

    /// Whether `self` sits directly inside `dir`.
    pub fn is_child_of(&self, dir: &WorkspacePath) -> bool {
        self.segments.len() == dir.segments.len() + 1 && self.segments.starts_with(&dir.segments)
    }

    /// Every prefix of this path paired with its segment name, outermost first.
    pub fn breadcrumbs(&self) -> Vec<(String, WorkspacePath)> {
        (1..=self.segments.len())
            .map(|len| {
                let crumb = Self {
                    segments: self.segments[..len].to_vec(),
                };
                (self.segments[len - 1].clone(), crumb)
            })
            .collect()
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// One row of a directory listing as served by the remote file service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "directory")]
    pub is_directory: bool,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
}

impl FileEntry {
    pub fn is_archive(&self) -> bool {
        !self.is_directory && self.name.ends_with(".zip")
    }
}

/// Kind of entry created from the file manager toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A file picked for upload, already read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// How opening a listed entry should be carried out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenAction {
    /// Navigate into a directory.
    Browse(WorkspacePath),
    /// Load the file into the in-app editor.
    Edit(WorkspacePath),
    /// Too large for the editor; hand the download URL to the browser.
    Download(WorkspacePath),
}

impl OpenAction {
    /// Decide how to open `entry` listed in `dir`, given the inline size limit.
    pub fn for_entry(
        dir: &WorkspacePath,
        entry: &FileEntry,
        inline_limit: u64,
    ) -> Result<Self, PathError> {
        let path = dir.join(&entry.name)?;
        Ok(if entry.is_directory {
            Self::Browse(path)
        } else if entry.size >= inline_limit {
            Self::Download(path)
        } else {
            Self::Edit(path)
        })
    }
}
