//! Browser-facing utilities.
//!
//! Provides:
//! - [`FetchTransport`] - HTTP transport over the fetch API
//! - [`StompSocket`] - WebSocket connection feeding the push channel
//! - [`logging`] - `log` backend for the browser console
//! - [`format_size`], [`format_modified`] - Display formatting

pub mod dom;
mod format;
mod http;
pub mod logging;
mod socket;

pub use format::{format_modified, format_size};
pub use http::{FetchTransport, read_upload};
pub use socket::StompSocket;
