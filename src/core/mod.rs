//! Client-side synchronization core.
//!
//! Nothing here touches the browser, so every module is unit-tested on the
//! host target:
//! - `LogBuffer` - Bounded console output
//! - [`PushChannel`], `SubscriptionManager` - Push routing and per-view subscriptions
//! - [`Workspace`], [`Dispatcher`] - File manager state machine and its effect runner
//! - [`RemoteClient`] - Remote Sync Layer over an [`remote::HttpTransport`]
//! - [`ConsoleSession`], [`ProcessList`] - Process-facing views

mod console;
mod dispatch;
pub mod error;
mod log_buffer;
mod processes;
pub mod push;
pub mod remote;
pub mod stomp;
mod subscriptions;
pub mod workspace;

pub use console::ConsoleSession;
pub use dispatch::Dispatcher;
pub use processes::ProcessList;
pub use push::PushChannel;
pub use remote::RemoteClient;
pub use workspace::{Listing, Workspace, WorkspaceEvent};
