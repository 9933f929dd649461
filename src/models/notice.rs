//! User-facing messages for operation outcomes.

use crate::core::error::{InputError, SyncError};
use crate::core::remote::Operation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

/// A dismissible message shown at the bottom of the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Message for a failed operation on process `process`.
    pub fn failure(op: Operation, err: &SyncError, process: &str) -> Self {
        Self::error(failure_text(op, err, process))
    }

    /// Message for a successful operation, if that operation announces success.
    pub fn success_for(op: Operation) -> Option<Self> {
        match op {
            Operation::SaveContent => Some(Self::success("File content has been saved!")),
            Operation::CreateProcess => Some(Self::success("The server has been created.")),
            Operation::UpdateProcess => Some(Self::success("The server has been updated.")),
            _ => None,
        }
    }
}

fn failure_text(op: Operation, err: &SyncError, process: &str) -> String {
    match err {
        SyncError::InvalidInput(input) => invalid_input_text(input).to_string(),
        SyncError::NameConflict => conflict_text(op).to_string(),
        SyncError::NotFound => match op {
            Operation::CreateProcess | Operation::UpdateProcess => {
                "The working directory does not exist.".to_string()
            }
            op if op.is_process_control() => format!("The server {} does not exist.", process),
            _ => "The file or directory no longer exists.".to_string(),
        },
        SyncError::PreconditionFailed => match op {
            Operation::RemoveProcess => {
                "The server is currently online. It needs to be shut down before being removed."
                    .to_string()
            }
            Operation::UpdateProcess => {
                "The server is currently online. It cannot be modified.".to_string()
            }
            _ => format!(
                "The server {} is not in a state that allows this action.",
                process
            ),
        },
        SyncError::Transport(_) => generic_text(op, process),
    }
}

fn invalid_input_text(err: &InputError) -> &'static str {
    match err {
        InputError::EmptyName | InputError::NameContainsSeparator => "The name is invalid.",
        InputError::NoDirectory => "Select a directory first.",
        InputError::EmptySelection => "No file is selected.",
        InputError::NothingToPaste => "There is nothing to paste.",
        InputError::EmptyCommand => "The command is empty.",
        InputError::EmptyWorkingDirectory => "The working directory is required.",
    }
}

fn conflict_text(op: Operation) -> &'static str {
    match op {
        Operation::Move => "The name of the moved file is already used at the destination.",
        Operation::Copy => "The name of the copied file is already used at the destination.",
        Operation::MoveMany | Operation::CopyMany => {
            "Some of the names are already used at the destination."
        }
        Operation::Upload => "The name of the uploaded file is already in use.",
        Operation::Compress => "The name of the archive is already in use.",
        Operation::CreateProcess => "A server with this name already exists.",
        _ => "The name is already used.",
    }
}

fn generic_text(op: Operation, process: &str) -> String {
    let text = match op {
        Operation::ListDirectories => "Could not retrieve the directories of the server.",
        Operation::List => "Could not retrieve the files of the server.",
        Operation::CreateDirectory => "Could not create the directory.",
        Operation::CreateFile => "Could not create the file.",
        Operation::Upload => "Could not upload the file.",
        Operation::Rename => "Could not rename the file.",
        Operation::Delete => "Could not delete the file.",
        Operation::DeleteMany => "Could not delete the files.",
        Operation::Move => "Could not move the file.",
        Operation::MoveMany => "Could not move the files.",
        Operation::Copy => "Could not copy the file.",
        Operation::CopyMany => "Could not copy the files.",
        Operation::Compress => "Could not create the archive.",
        Operation::Decompress => "Could not unzip the archive.",
        Operation::FetchContent => "Could not retrieve the file content.",
        Operation::SaveContent => "Could not save the file content.",
        Operation::Start => return format!("The server {} could not be started.", process),
        Operation::Stop => return format!("The server {} could not be stopped.", process),
        Operation::Kill => return format!("The server {} could not be killed.", process),
        Operation::Restart => return format!("The server {} could not be restarted.", process),
        Operation::FetchStatus => "Could not get the status of the server.",
        Operation::FetchConsole => "Could not get the console of the server.",
        Operation::SendCommand => "Could not send the command to the server.",
        Operation::ListProcesses => "Could not retrieve the servers.",
        Operation::FetchSettings => "Could not load the server data.",
        Operation::CreateProcess => "There was an error creating the server.",
        Operation::UpdateProcess => "Could not update the server.",
        Operation::RemoveProcess => "The server could not be removed.",
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages_are_operation_specific() {
        let notice = Notice::failure(Operation::Move, &SyncError::NameConflict, "alpha");
        assert_eq!(
            notice.text,
            "The name of the moved file is already used at the destination."
        );
        let notice = Notice::failure(Operation::CreateDirectory, &SyncError::NameConflict, "alpha");
        assert_eq!(notice.text, "The name is already used.");
    }

    #[test]
    fn test_transport_failures_use_one_generic_message() {
        let a = Notice::failure(Operation::Start, &SyncError::transport("HTTP 500"), "alpha");
        let b = Notice::failure(Operation::Start, &SyncError::transport("offline"), "alpha");
        assert_eq!(a, b);
        assert_eq!(a.text, "The server alpha could not be started.");
        assert_eq!(a.kind, NoticeKind::Error);
    }

    #[test]
    fn test_bad_working_directory() {
        let notice = Notice::failure(Operation::CreateProcess, &SyncError::NotFound, "alpha");
        assert_eq!(notice.text, "The working directory does not exist.");
    }

    #[test]
    fn test_precondition_messages() {
        let notice =
            Notice::failure(Operation::RemoveProcess, &SyncError::PreconditionFailed, "alpha");
        assert!(notice.text.starts_with("The server is currently online."));
    }

    #[test]
    fn test_success_notice() {
        assert_eq!(
            Notice::success_for(Operation::SaveContent).map(|n| n.kind),
            Some(NoticeKind::Success)
        );
        assert_eq!(Notice::success_for(Operation::Delete), None);
    }
}
