//! Application configuration.
//!
//! Compile-time constants plus the few limits the host page may override
//! through `<meta>` tags.

use log::LevelFilter;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the header.
pub const APP_NAME: &str = "fleetdeck";

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;

// =============================================================================
// Network Configuration
// =============================================================================

/// Prefix of every REST route.
pub const API_PREFIX: &str = "/api";

/// Path of the push-channel WebSocket endpoint, relative to the page origin.
pub const WEBSOCKET_PATH: &str = "/api/websocket";

/// Cookie holding the anti-forgery token echoed on mutating requests.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header carrying the anti-forgery token.
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

// =============================================================================
// Limits
// =============================================================================

/// Console lines kept per process when the page sets no override.
pub const DEFAULT_CONSOLE_CAPACITY: usize = 500;

/// Files at or above this many bytes are downloaded instead of edited.
pub const DEFAULT_INLINE_FILE_LIMIT: u64 = 2 * 1024 * 1024;

/// Element id of the console capacity override.
const CONSOLE_CAPACITY_META: &str = "consoleCacheSize";

/// Element id of the inline file limit override.
const INLINE_FILE_LIMIT_META: &str = "maxFileSize";

// =============================================================================
// Logging
// =============================================================================

pub const LOG_LEVEL: LevelFilter = if cfg!(debug_assertions) {
    LevelFilter::Debug
} else {
    LevelFilter::Info
};

/// Limits resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub console_capacity: usize,
    pub inline_file_limit: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            console_capacity: DEFAULT_CONSOLE_CAPACITY,
            inline_file_limit: DEFAULT_INLINE_FILE_LIMIT,
        }
    }
}

impl AppConfig {
    /// Read overrides from the host page, keeping defaults for missing or
    /// malformed values.
    pub fn from_document() -> Self {
        let defaults = Self::default();
        Self {
            console_capacity: meta_content(CONSOLE_CAPACITY_META)
                .and_then(|raw| parse_limit(&raw))
                .and_then(|value| usize::try_from(value).ok())
                .unwrap_or(defaults.console_capacity),
            inline_file_limit: meta_content(INLINE_FILE_LIMIT_META)
                .and_then(|raw| parse_limit(&raw))
                .unwrap_or(defaults.inline_file_limit),
        }
    }
}

fn meta_content(id: &str) -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .get_attribute("content")
}

/// A positive integer limit; zero and garbage are rejected.
pub fn parse_limit(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|value| *value > 0)
}
