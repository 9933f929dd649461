//! File workspace state machine.
//!
//! [`Workspace`] tracks three orthogonal axes for one process's file
//! manager: the current directory, the selection, and at most one pending
//! clipboard operation. Every transition is a [`WorkspaceEvent`] handed to
//! [`Workspace::handle`], which runs to completion and returns the
//! [`Effect`]s the dispatcher must carry out. Completions come back as
//! events too, so the whole machine is synchronous and testable without a
//! browser.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::core::error::{InputError, SyncError};
use crate::core::remote::Operation;
use crate::models::{EntryKind, FileEntry, Notice, UploadFile, WorkspacePath, validate_name};

// =============================================================================
// State types
// =============================================================================

/// Targets of a pending clipboard operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Single(WorkspacePath),
    Batch(BTreeSet<WorkspacePath>),
}

impl Scope {
    pub fn paths(&self) -> Vec<WorkspacePath> {
        match self {
            Self::Single(path) => vec![path.clone()],
            Self::Batch(paths) => paths.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(paths) => paths.len(),
        }
    }
}

/// A pending move or copy awaiting a destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardOp {
    Move(Scope),
    Copy(Scope),
}

impl ClipboardOp {
    pub fn scope(&self) -> &Scope {
        match self {
            Self::Move(scope) | Self::Copy(scope) => scope,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Move(Scope::Single(_)) => Operation::Move,
            Self::Move(Scope::Batch(_)) => Operation::MoveMany,
            Self::Copy(Scope::Single(_)) => Operation::Copy,
            Self::Copy(Scope::Batch(_)) => Operation::CopyMany,
        }
    }
}

/// What the file table currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Listing {
    #[default]
    NotLoaded,
    /// Entries of `dir`, which lags the current directory until its
    /// listing arrives.
    Loaded {
        dir: WorkspacePath,
        entries: Vec<FileEntry>,
    },
    /// The process has no top-level directory at all.
    NoValidRoot,
}

/// A remote write requested by the workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Create {
        kind: EntryKind,
        dir: WorkspacePath,
        name: String,
    },
    Upload {
        dir: WorkspacePath,
        file: UploadFile,
    },
    Rename {
        path: WorkspacePath,
        new_name: String,
    },
    Delete(WorkspacePath),
    DeleteMany {
        dir: WorkspacePath,
        paths: Vec<WorkspacePath>,
    },
    /// Paste of a clipboard operation into `destination`.
    Transfer {
        op: ClipboardOp,
        destination: WorkspacePath,
    },
    Compress {
        archive: WorkspacePath,
        paths: Vec<WorkspacePath>,
    },
    Decompress(WorkspacePath),
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create {
                kind: EntryKind::Directory,
                ..
            } => Operation::CreateDirectory,
            Self::Create {
                kind: EntryKind::File,
                ..
            } => Operation::CreateFile,
            Self::Upload { .. } => Operation::Upload,
            Self::Rename { .. } => Operation::Rename,
            Self::Delete(_) => Operation::Delete,
            Self::DeleteMany { .. } => Operation::DeleteMany,
            Self::Transfer { op, .. } => op.operation(),
            Self::Compress { .. } => Operation::Compress,
            Self::Decompress(_) => Operation::Decompress,
        }
    }

    fn clears_selection(&self) -> bool {
        matches!(self, Self::DeleteMany { .. } | Self::Compress { .. })
    }
}

/// Work the dispatcher performs on behalf of the workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the listing of a directory (the top-level picker for the null path).
    Load(WorkspacePath),
    Mutate(Mutation),
}

// =============================================================================
// Events
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Navigate(WorkspacePath),
    SelectionToggled {
        path: WorkspacePath,
        checked: bool,
    },
    StartMove(WorkspacePath),
    StartCopy(WorkspacePath),
    StartMoveSelected,
    StartCopySelected,
    CancelClipboard,
    PasteRequested,
    CreateEntry {
        kind: EntryKind,
        name: String,
    },
    Rename {
        path: WorkspacePath,
        new_name: String,
    },
    Delete(WorkspacePath),
    DeleteSelected,
    /// `archive_name` is given without the ".zip" extension.
    CompressSelected {
        archive_name: String,
    },
    Decompress(WorkspacePath),
    Upload(UploadFile),
    Refresh,
    ListingLoaded {
        path: WorkspacePath,
        result: Result<Vec<FileEntry>, SyncError>,
    },
    MutationFinished {
        mutation: Mutation,
        result: Result<(), SyncError>,
    },
}

// =============================================================================
// Workspace
// =============================================================================

#[derive(Clone, Debug)]
pub struct Workspace {
    process: String,
    directory: WorkspacePath,
    selection: BTreeSet<WorkspacePath>,
    clipboard: Option<ClipboardOp>,
    listing: Listing,
    loading: bool,
    pending: usize,
    notice: Option<Notice>,
    last_failure: Option<SyncError>,
}

impl Workspace {
    /// Workspace for `process`, opened at `directory`. Call [`Workspace::open`]
    /// to get the initial load.
    pub fn new(process: impl Into<String>, directory: WorkspacePath) -> Self {
        Self {
            process: process.into(),
            directory,
            selection: BTreeSet::new(),
            clipboard: None,
            listing: Listing::NotLoaded,
            loading: false,
            pending: 0,
            notice: None,
            last_failure: None,
        }
    }

    /// Initial effects.
    pub fn open(&mut self) -> Vec<Effect> {
        self.load()
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn directory(&self) -> &WorkspacePath {
        &self.directory
    }

    pub fn selection(&self) -> &BTreeSet<WorkspacePath> {
        &self.selection
    }

    pub fn is_selected(&self, path: &WorkspacePath) -> bool {
        self.selection.contains(path)
    }

    pub fn clipboard(&self) -> Option<&ClipboardOp> {
        self.clipboard.as_ref()
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Mutations issued and not yet finished.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Error of the most recent failed operation, cleared by the next success.
    pub fn last_failure(&self) -> Option<&SyncError> {
        self.last_failure.as_ref()
    }

    /// Apply one event.
    ///
    /// Rejected input is returned as an error and also recorded as the
    /// current notice; no effect is produced for it.
    pub fn handle(&mut self, event: WorkspaceEvent) -> Result<Vec<Effect>, InputError> {
        let op = command_operation(&event);
        let outcome = self.apply(event);
        if let (Err(err), Some(op)) = (&outcome, op) {
            debug!("{:?} rejected: {}", op, err);
            let err = SyncError::InvalidInput(err.clone());
            self.notice = Some(Notice::failure(op, &err, &self.process));
            self.last_failure = Some(err);
        }
        outcome
    }

    fn apply(&mut self, event: WorkspaceEvent) -> Result<Vec<Effect>, InputError> {
        match event {
            WorkspaceEvent::Navigate(path) => Ok(self.navigate(path)),
            WorkspaceEvent::SelectionToggled { path, checked } => {
                self.toggle(path, checked);
                Ok(Vec::new())
            }
            WorkspaceEvent::StartMove(path) => {
                self.clipboard = Some(ClipboardOp::Move(Scope::Single(path)));
                Ok(Vec::new())
            }
            WorkspaceEvent::StartCopy(path) => {
                self.clipboard = Some(ClipboardOp::Copy(Scope::Single(path)));
                Ok(Vec::new())
            }
            WorkspaceEvent::StartMoveSelected => {
                if !self.selection.is_empty() {
                    self.clipboard = Some(ClipboardOp::Move(Scope::Batch(self.selection.clone())));
                }
                Ok(Vec::new())
            }
            WorkspaceEvent::StartCopySelected => {
                if !self.selection.is_empty() {
                    self.clipboard = Some(ClipboardOp::Copy(Scope::Batch(self.selection.clone())));
                }
                Ok(Vec::new())
            }
            WorkspaceEvent::CancelClipboard => {
                self.clipboard = None;
                Ok(Vec::new())
            }
            WorkspaceEvent::PasteRequested => {
                let op = self.clipboard.clone().ok_or(InputError::NothingToPaste)?;
                let destination = self.current_dir()?;
                Ok(self.mutate(Mutation::Transfer { op, destination }))
            }
            WorkspaceEvent::CreateEntry { kind, name } => {
                let dir = self.current_dir()?;
                let name = validate_name(&name)?.to_string();
                Ok(self.mutate(Mutation::Create { kind, dir, name }))
            }
            WorkspaceEvent::Rename { path, new_name } => {
                self.current_dir()?;
                let new_name = validate_name(&new_name)?.to_string();
                Ok(self.mutate(Mutation::Rename { path, new_name }))
            }
            WorkspaceEvent::Delete(path) => {
                self.current_dir()?;
                Ok(self.mutate(Mutation::Delete(path)))
            }
            WorkspaceEvent::DeleteSelected => {
                let dir = self.current_dir()?;
                let paths = self.selected_paths()?;
                Ok(self.mutate(Mutation::DeleteMany { dir, paths }))
            }
            WorkspaceEvent::CompressSelected { archive_name } => {
                let dir = self.current_dir()?;
                let name = validate_name(&archive_name)?;
                let archive = dir.join(&format!("{}.zip", name))?;
                let paths = self.selected_paths()?;
                Ok(self.mutate(Mutation::Compress { archive, paths }))
            }
            WorkspaceEvent::Decompress(path) => {
                self.current_dir()?;
                Ok(self.mutate(Mutation::Decompress(path)))
            }
            WorkspaceEvent::Upload(file) => {
                let dir = self.current_dir()?;
                validate_name(&file.name)?;
                Ok(self.mutate(Mutation::Upload { dir, file }))
            }
            WorkspaceEvent::Refresh => Ok(self.load()),
            WorkspaceEvent::ListingLoaded { path, result } => Ok(self.listing_loaded(path, result)),
            WorkspaceEvent::MutationFinished { mutation, result } => {
                Ok(self.mutation_finished(mutation, result))
            }
        }
    }

    fn navigate(&mut self, path: WorkspacePath) -> Vec<Effect> {
        debug!("navigate {} -> {}", self.process, path);
        self.directory = path;
        self.selection.clear();
        self.load()
    }

    fn load(&mut self) -> Vec<Effect> {
        self.loading = true;
        vec![Effect::Load(self.directory.clone())]
    }

    fn toggle(&mut self, path: WorkspacePath, checked: bool) {
        if !checked {
            self.selection.remove(&path);
            return;
        }
        if self.directory.is_root() || !self.is_listed(&path) {
            debug!("ignoring selection of unlisted {}", path);
            return;
        }
        self.selection.insert(path);
    }

    fn is_listed(&self, path: &WorkspacePath) -> bool {
        let Listing::Loaded { dir, entries } = &self.listing else {
            return false;
        };
        dir == &self.directory
            && path.is_child_of(dir)
            && path
                .name()
                .is_some_and(|name| entries.iter().any(|entry| entry.name == name))
    }

    fn current_dir(&self) -> Result<WorkspacePath, InputError> {
        if self.directory.is_root() {
            Err(InputError::NoDirectory)
        } else {
            Ok(self.directory.clone())
        }
    }

    fn selected_paths(&self) -> Result<Vec<WorkspacePath>, InputError> {
        if self.selection.is_empty() {
            Err(InputError::EmptySelection)
        } else {
            Ok(self.selection.iter().cloned().collect())
        }
    }

    fn mutate(&mut self, mutation: Mutation) -> Vec<Effect> {
        self.pending += 1;
        vec![Effect::Mutate(mutation)]
    }

    fn listing_loaded(
        &mut self,
        path: WorkspacePath,
        result: Result<Vec<FileEntry>, SyncError>,
    ) -> Vec<Effect> {
        if path != self.directory {
            debug!("dropping stale listing of {}", path);
            return Vec::new();
        }
        self.loading = false;

        let entries = match result {
            Ok(entries) => entries,
            Err(err) => {
                let op = if path.is_root() {
                    Operation::ListDirectories
                } else {
                    Operation::List
                };
                self.fail(op, err);
                return Vec::new();
            }
        };

        self.selection.clear();
        if !path.is_root() {
            self.listing = Listing::Loaded { dir: path, entries };
            return Vec::new();
        }

        let mut directories: Vec<FileEntry> =
            entries.into_iter().filter(|entry| entry.is_directory).collect();
        match directories.len() {
            0 => {
                info!("{} has no valid root directory", self.process);
                self.listing = Listing::NoValidRoot;
                Vec::new()
            }
            1 => {
                let only = directories.remove(0);
                match self.directory.join(&only.name) {
                    Ok(path) => self.navigate(path),
                    Err(_) => {
                        self.listing = Listing::Loaded {
                            dir: path,
                            entries: vec![only],
                        };
                        Vec::new()
                    }
                }
            }
            _ => {
                self.listing = Listing::Loaded {
                    dir: path,
                    entries: directories,
                };
                Vec::new()
            }
        }
    }

    fn mutation_finished(
        &mut self,
        mutation: Mutation,
        result: Result<(), SyncError>,
    ) -> Vec<Effect> {
        self.pending = self.pending.saturating_sub(1);
        let op = mutation.operation();
        if let Err(err) = result {
            self.fail(op, err);
            return Vec::new();
        }

        debug!("{:?} succeeded", op);
        self.last_failure = None;
        if let Some(notice) = Notice::success_for(op) {
            self.notice = Some(notice);
        }
        if let Mutation::Transfer { op: finished, .. } = &mutation
            && self.clipboard.as_ref() == Some(finished)
        {
            self.clipboard = None;
        }
        if mutation.clears_selection() {
            self.selection.clear();
        }
        self.load()
    }

    fn fail(&mut self, op: Operation, err: SyncError) {
        self.notice = Some(Notice::failure(op, &err, &self.process));
        self.last_failure = Some(err);
    }
}

/// Operation a user command would issue, for rejection messages.
fn command_operation(event: &WorkspaceEvent) -> Option<Operation> {
    Some(match event {
        WorkspaceEvent::PasteRequested => Operation::Copy,
        WorkspaceEvent::CreateEntry {
            kind: EntryKind::Directory,
            ..
        } => Operation::CreateDirectory,
        WorkspaceEvent::CreateEntry {
            kind: EntryKind::File,
            ..
        } => Operation::CreateFile,
        WorkspaceEvent::Rename { .. } => Operation::Rename,
        WorkspaceEvent::Delete(_) => Operation::Delete,
        WorkspaceEvent::DeleteSelected => Operation::DeleteMany,
        WorkspaceEvent::CompressSelected { .. } => Operation::Compress,
        WorkspaceEvent::Decompress(_) => Operation::Decompress,
        WorkspaceEvent::Upload(_) => Operation::Upload,
        _ => return None,
    })
}
