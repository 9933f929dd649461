//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`ProcessSummary`], [`ProcessStatus`], [`ProcessSettings`] - Managed processes
//! - [`WorkspacePath`], [`FileEntry`] - Remote file tree
//! - [`LogLine`] - Console output
//! - [`NameForm`], [`DialogKind`] - Name prompts
//! - [`Notice`] - Operation outcome messages
//! - [`AppRoute`] - Hash-based navigation

mod console;
mod dialog;
mod file;
mod notice;
mod process;
mod route;

pub use console::LogLine;
pub use dialog::{DialogKind, FormFeedback, NameForm, validate_name};
pub use file::{EntryKind, FileEntry, OpenAction, UploadFile, WorkspacePath};
pub use notice::{Notice, NoticeKind};
pub use process::{ControlAction, ProcessSettings, ProcessStatus, ProcessSummary};
pub use route::AppRoute;
