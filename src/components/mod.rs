//! UI components built with Leptos.
//!
//! - [`router`] - Hash routing (main entry point)
//! - [`layout`] - Header, process navigation and connection indicator
//! - [`processes`] - Process table and settings form
//! - [`console`] - Live console of one process
//! - [`files`] - File manager
//! - [`editor`] - Text editor for small files
//! - [`notice`] - Dismissable operation feedback
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod console;
pub mod editor;
pub mod files;
pub mod icons;
pub mod layout;
pub mod notice;
pub mod processes;
pub mod router;

pub use router::AppRouter;
