//! Scripted transport for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tokio::sync::oneshot;

use super::client::{HttpRequest, HttpResponse, HttpTransport};
use crate::core::error::SyncError;

type Reply = Result<HttpResponse, SyncError>;

enum Scripted {
    Ready(Reply),
    /// Resolves once the paired sender fires or is dropped.
    Held(oneshot::Receiver<()>, Reply),
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<Scripted>,
    requests: Vec<HttpRequest>,
}

/// Replays queued replies in order and records every request.
/// Clones share the same script.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.push(Scripted::Ready(Ok(reply(status, body))));
    }

    pub fn fail(&self, detail: &str) {
        self.push(Scripted::Ready(Err(SyncError::transport(detail))));
    }

    /// Queue a reply that stays pending until the returned sender fires.
    pub fn hold(&self, status: u16, body: &str) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        self.push(Scripted::Held(held, Ok(reply(status, body))));
        release
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state.borrow().requests.last().cloned()
    }

    /// `"METHOD url"` for every request so far.
    pub fn request_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .requests
            .iter()
            .map(|request| format!("{} {}", request.method.as_str(), request.url))
            .collect()
    }

    fn push(&self, scripted: Scripted) {
        self.state.borrow_mut().replies.push_back(scripted);
    }
}

fn reply(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SyncError> {
        let scripted = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request);
            state.replies.pop_front()
        };
        match scripted {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Held(held, reply)) => {
                let _ = held.await;
                reply
            }
            None => Err(SyncError::transport("no scripted reply")),
        }
    }
}
