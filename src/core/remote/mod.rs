//! Remote Sync Layer.
//!
//! - [`RemoteClient`] - One async method per file or process operation
//! - [`Operation`], [`Contract`] - Status-code contract per operation
//! - [`HttpTransport`] - Request seam, implemented over `gloo-net` in the browser

mod client;
mod contract;
#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpRequest, HttpResponse, HttpTransport, Method, RemoteClient, RequestBody};
pub use contract::{Contract, Operation};
