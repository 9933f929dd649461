//! Hash-based routing.
//!
//! URL format:
//! - `#/` - process list
//! - `#/new` - create a process
//! - `#/settings/{name}` - edit a process
//! - `#/console/{name}` - console of one process
//! - `#/files/{name}/{path}` - file manager, `path` may be empty
//! - `#/edit/{name}/{path}` - editor for one file

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use super::WorkspacePath;

/// Characters escaped in a route segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    Processes,
    NewProcess,
    Settings { name: String },
    Console { name: String },
    Files { name: String, path: WorkspacePath },
    Edit { name: String, path: WorkspacePath },
}

impl AppRoute {
    /// Parse a URL hash. Anything unrecognized falls back to the process list.
    pub fn from_hash(hash: &str) -> Self {
        let raw = hash.trim_start_matches('#').trim_matches('/');
        let mut parts = raw.splitn(3, '/');
        let head = parts.next().unwrap_or_default();
        let name = parts.next().map(decode).filter(|name| !name.is_empty());
        let rest = parts.next().map(decode).unwrap_or_default();

        match (head, name) {
            ("new", None) => Self::NewProcess,
            ("settings", Some(name)) => Self::Settings { name },
            ("console", Some(name)) => Self::Console { name },
            ("files", Some(name)) => match WorkspacePath::parse(&rest) {
                Ok(path) => Self::Files { name, path },
                Err(_) => Self::Files {
                    name,
                    path: WorkspacePath::root(),
                },
            },
            ("edit", Some(name)) => match WorkspacePath::parse(&rest) {
                Ok(path) if !path.is_root() => Self::Edit { name, path },
                _ => Self::Files {
                    name,
                    path: WorkspacePath::root(),
                },
            },
            _ => Self::Processes,
        }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Self::Processes => "#/".to_string(),
            Self::NewProcess => "#/new".to_string(),
            Self::Settings { name } => format!("#/settings/{}", encode(name)),
            Self::Console { name } => format!("#/console/{}", encode(name)),
            Self::Files { name, path } => {
                format!("#/files/{}/{}", encode(name), encode_path(path))
            }
            Self::Edit { name, path } => {
                format!("#/edit/{}/{}", encode(name), encode_path(path))
            }
        }
    }

    /// The process this route is about, if any.
    pub fn process(&self) -> Option<&str> {
        match self {
            Self::Processes | Self::NewProcess => None,
            Self::Settings { name }
            | Self::Console { name }
            | Self::Files { name, .. }
            | Self::Edit { name, .. } => Some(name),
        }
    }

    /// Where closing this view leads.
    pub fn parent(&self) -> Self {
        match self {
            Self::Edit { name, path } => Self::Files {
                name: name.clone(),
                path: path.parent(),
            },
            _ => Self::Processes,
        }
    }

    /// Current route from the browser URL.
    pub fn current() -> Self {
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        Self::from_hash(&hash)
    }

    /// Navigate to this route. Fires `hashchange`, which the router listens for.
    pub fn push(&self) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(&self.to_hash());
        }
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn encode_path(path: &WorkspacePath) -> String {
    path.breadcrumbs()
        .iter()
        .map(|(segment, _)| encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
