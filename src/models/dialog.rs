//! Name prompt shared by the create, rename and archive dialogs.

use crate::core::error::InputError;
use crate::models::WorkspacePath;

/// Which prompt is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogKind {
    NewDirectory,
    NewFile,
    Rename { original: WorkspacePath },
    NewArchive,
}

/// Static copy for one dialog kind.
#[derive(Debug, PartialEq, Eq)]
pub struct DialogText {
    pub title: &'static str,
    pub label: &'static str,
    pub submit: &'static str,
}

const NEW_DIRECTORY: DialogText = DialogText {
    title: "New Directory",
    label: "Directory name",
    submit: "Create",
};

const NEW_FILE: DialogText = DialogText {
    title: "New File",
    label: "File name",
    submit: "Create",
};

const RENAME: DialogText = DialogText {
    title: "Rename File",
    label: "New name",
    submit: "Save",
};

const NEW_ARCHIVE: DialogText = DialogText {
    title: "New Archive",
    label: "Archive name (without extension)",
    submit: "Create",
};

impl DialogKind {
    pub fn text(&self) -> &'static DialogText {
        match self {
            Self::NewDirectory => &NEW_DIRECTORY,
            Self::NewFile => &NEW_FILE,
            Self::Rename { .. } => &RENAME,
            Self::NewArchive => &NEW_ARCHIVE,
        }
    }

    /// Prefilled input value: the current name when renaming, empty otherwise.
    pub fn initial_value(&self) -> String {
        match self {
            Self::Rename { original } => original.name().unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }
}

/// Check a single entry name typed by the user.
pub fn validate_name(name: &str) -> Result<&str, InputError> {
    if name.trim().is_empty() {
        Err(InputError::EmptyName)
    } else if name.contains('/') {
        Err(InputError::NameContainsSeparator)
    } else {
        Ok(name)
    }
}

/// Validation state shown under the input. Replaced as a whole on every
/// submission attempt, so no stale flag survives a later success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormFeedback {
    #[default]
    Clean,
    Invalid(InputError),
}

/// Editable state of an open name dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameForm {
    pub kind: DialogKind,
    pub value: String,
    pub feedback: FormFeedback,
}

impl NameForm {
    pub fn open(kind: DialogKind) -> Self {
        let value = kind.initial_value();
        Self {
            kind,
            value,
            feedback: FormFeedback::Clean,
        }
    }

    /// Validate the current value. Returns the name to submit, or records
    /// the failure in `feedback`.
    pub fn submit(&mut self) -> Option<String> {
        match validate_name(&self.value) {
            Ok(name) => {
                let name = name.to_string();
                self.feedback = FormFeedback::Clean;
                Some(name)
            }
            Err(err) => {
                self.feedback = FormFeedback::Invalid(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_text_lookup() {
        assert_eq!(DialogKind::NewDirectory.text().title, "New Directory");
        assert_eq!(DialogKind::NewArchive.text().label, "Archive name (without extension)");
        let rename = DialogKind::Rename {
            original: WorkspacePath::parse("srv/server.properties").unwrap(),
        };
        assert_eq!(rename.text().submit, "Save");
        assert_eq!(rename.initial_value(), "server.properties");
        assert_eq!(DialogKind::NewFile.initial_value(), "");
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("backup"), Ok("backup"));
        assert_eq!(validate_name("   "), Err(InputError::EmptyName));
        assert_eq!(validate_name("a/b"), Err(InputError::NameContainsSeparator));
    }

    #[test]
    fn test_feedback_resets_on_next_submission() {
        let mut form = NameForm::open(DialogKind::NewFile);
        assert_eq!(form.submit(), None);
        assert_eq!(form.feedback, FormFeedback::Invalid(InputError::EmptyName));

        form.value = "notes.txt".into();
        assert_eq!(form.submit().as_deref(), Some("notes.txt"));
        assert_eq!(form.feedback, FormFeedback::Clean);
    }
}
