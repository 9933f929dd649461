//! Status-code contract of the remote service.

use crate::core::error::SyncError;
use crate::models::ControlAction;

/// Every request the dashboard issues, named for messages and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDirectories,
    List,
    CreateDirectory,
    CreateFile,
    Upload,
    Rename,
    Delete,
    DeleteMany,
    Move,
    MoveMany,
    Copy,
    CopyMany,
    Compress,
    Decompress,
    FetchContent,
    SaveContent,
    Start,
    Stop,
    Kill,
    Restart,
    FetchStatus,
    FetchConsole,
    SendCommand,
    ListProcesses,
    FetchSettings,
    CreateProcess,
    UpdateProcess,
    RemoveProcess,
}

/// How a response status is judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contract {
    /// 200 is success, anything else is a transport failure.
    Read,
    /// 201 is success, 409 is a name conflict.
    Create,
    /// 204 is success, 404 not found, 405 precondition failed, and 409 a
    /// name conflict only when `conflict` is set.
    Mutation { conflict: bool },
}

impl Operation {
    pub fn contract(self) -> Contract {
        match self {
            Self::ListDirectories
            | Self::List
            | Self::FetchContent
            | Self::FetchStatus
            | Self::FetchConsole
            | Self::ListProcesses
            | Self::FetchSettings => Contract::Read,
            Self::CreateDirectory | Self::CreateFile | Self::Upload => Contract::Create,
            Self::Rename
            | Self::Move
            | Self::MoveMany
            | Self::Copy
            | Self::CopyMany
            | Self::Compress
            | Self::CreateProcess => Contract::Mutation { conflict: true },
            Self::Delete
            | Self::DeleteMany
            | Self::Decompress
            | Self::SaveContent
            | Self::Start
            | Self::Stop
            | Self::Kill
            | Self::Restart
            | Self::SendCommand
            | Self::UpdateProcess
            | Self::RemoveProcess => Contract::Mutation { conflict: false },
        }
    }

    pub fn is_process_control(self) -> bool {
        matches!(self, Self::Start | Self::Stop | Self::Kill | Self::Restart)
    }
}

impl From<ControlAction> for Operation {
    fn from(action: ControlAction) -> Self {
        match action {
            ControlAction::Start => Self::Start,
            ControlAction::Stop => Self::Stop,
            ControlAction::Kill => Self::Kill,
            ControlAction::Restart => Self::Restart,
        }
    }
}

impl Contract {
    /// Map a response status onto the result taxonomy.
    pub fn classify(self, status: u16) -> Result<(), SyncError> {
        match (self, status) {
            (Self::Read, 200) | (Self::Create, 201) | (Self::Mutation { .. }, 204) => Ok(()),
            (Self::Create, 409) | (Self::Mutation { conflict: true }, 409) => {
                Err(SyncError::NameConflict)
            }
            (Self::Mutation { .. }, 404) => Err(SyncError::NotFound),
            (Self::Mutation { .. }, 405) => Err(SyncError::PreconditionFailed),
            (_, status) => Err(SyncError::transport(format!(
                "unexpected status {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: [u16; 9] = [200, 201, 204, 400, 404, 405, 409, 500, 503];

    fn outcome(op: Operation, status: u16) -> &'static str {
        match op.contract().classify(status) {
            Ok(()) => "ok",
            Err(SyncError::NameConflict) => "conflict",
            Err(SyncError::NotFound) => "not-found",
            Err(SyncError::PreconditionFailed) => "precondition",
            Err(SyncError::Transport(_)) => "transport",
            Err(SyncError::InvalidInput(_)) => "invalid",
        }
    }

    #[test]
    fn test_read_accepts_only_200() {
        for status in STATUSES {
            let expected = if status == 200 { "ok" } else { "transport" };
            assert_eq!(outcome(Operation::List, status), expected, "{}", status);
            assert_eq!(outcome(Operation::FetchStatus, status), expected, "{}", status);
        }
    }

    #[test]
    fn test_create_contract() {
        for op in [Operation::CreateDirectory, Operation::CreateFile, Operation::Upload] {
            for status in STATUSES {
                let expected = match status {
                    201 => "ok",
                    409 => "conflict",
                    _ => "transport",
                };
                assert_eq!(outcome(op, status), expected, "{:?} {}", op, status);
            }
        }
    }

    #[test]
    fn test_mutation_contract() {
        for op in [Operation::Rename, Operation::Move, Operation::Compress, Operation::CreateProcess] {
            assert_eq!(outcome(op, 204), "ok");
            assert_eq!(outcome(op, 409), "conflict");
            assert_eq!(outcome(op, 404), "not-found");
            assert_eq!(outcome(op, 405), "precondition");
            assert_eq!(outcome(op, 200), "transport");
            assert_eq!(outcome(op, 201), "transport");
        }
    }

    #[test]
    fn test_conflict_only_where_names_are_chosen() {
        for op in [
            Operation::Delete,
            Operation::DeleteMany,
            Operation::Decompress,
            Operation::Start,
            Operation::SendCommand,
            Operation::RemoveProcess,
        ] {
            assert_eq!(outcome(op, 409), "transport", "{:?}", op);
            assert_eq!(outcome(op, 405), "precondition", "{:?}", op);
        }
    }

    #[test]
    fn test_process_control_set() {
        assert!(Operation::Kill.is_process_control());
        assert!(!Operation::SendCommand.is_process_control());
    }
}
