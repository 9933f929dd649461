//! Process-wide push channel.
//!
//! [`PushChannel`] is the shared routing core behind the WebSocket: it hands
//! out [`SubscriptionHandle`]s, forwards SUBSCRIBE/UNSUBSCRIBE frames to the
//! connection through a [`FrameSink`], and dispatches incoming MESSAGE
//! frames to the callback registered for their subscription id.
//!
//! Only the connection owner calls [`PushChannel::attach`] and
//! [`PushChannel::detach`]; views only subscribe.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};

use crate::core::stomp::{Command, Frame};

/// Receives a push payload. Payloads are opaque text.
pub type PushCallback = Rc<dyn Fn(&str)>;

/// Outbound side of the live connection.
pub trait FrameSink {
    fn send(&self, frame: &Frame);
}

struct Route {
    topic: String,
    callback: PushCallback,
}

#[derive(Default)]
struct ChannelState {
    sink: Option<Rc<dyn FrameSink>>,
    next_subscription: u64,
    routes: HashMap<String, Route>,
    next_listener: u64,
    listeners: Vec<(u64, Rc<dyn Fn(bool)>)>,
}

impl ChannelState {
    fn connected(&self) -> bool {
        self.sink.is_some()
    }
}

/// Shared handle to the push channel. Cloning is cheap.
#[derive(Clone, Default)]
pub struct PushChannel {
    inner: Rc<RefCell<ChannelState>>,
}

impl PushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.borrow().connected()
    }

    /// Mark the channel connected and route outbound frames into `sink`.
    pub fn attach(&self, sink: Rc<dyn FrameSink>) {
        self.inner.borrow_mut().sink = Some(sink);
        info!("push channel connected");
        self.notify(true);
    }

    /// Mark the channel disconnected.
    ///
    /// The broker forgets every subscription with the session, so the
    /// routing table is cleared; surviving handles cancel as a no-op.
    pub fn detach(&self) {
        let dropped = {
            let mut state = self.inner.borrow_mut();
            if !state.connected() {
                return;
            }
            state.sink = None;
            let dropped = state.routes.len();
            state.routes.clear();
            dropped
        };
        info!("push channel disconnected, dropped {} subscriptions", dropped);
        self.notify(false);
    }

    /// Open one subscription. Returns `None` while disconnected.
    pub fn subscribe(&self, topic: &str, callback: PushCallback) -> Option<SubscriptionHandle> {
        let (id, sink) = {
            let mut state = self.inner.borrow_mut();
            let sink = state.sink.clone()?;
            let id = format!("sub-{}", state.next_subscription);
            state.next_subscription += 1;
            state.routes.insert(
                id.clone(),
                Route {
                    topic: topic.to_string(),
                    callback,
                },
            );
            (id, sink)
        };
        debug!("subscribe {} -> {}", id, topic);
        sink.send(&Frame::subscribe(&id, topic));
        Some(SubscriptionHandle {
            id,
            topic: topic.to_string(),
            channel: Rc::downgrade(&self.inner),
            cancelled: Cell::new(false),
        })
    }

    /// Route one inbound frame.
    ///
    /// MESSAGE frames whose subscription is no longer routed (canceled, or
    /// from before a reconnect) are dropped here, so no callback ever runs
    /// for a superseded subscription.
    pub fn deliver(&self, frame: &Frame) {
        match frame.command {
            Command::Message => {}
            Command::Error => {
                warn!(
                    "push channel error: {}",
                    frame.header("message").unwrap_or(frame.body.as_str())
                );
                return;
            }
            _ => return,
        }

        let Some(id) = frame.header("subscription") else {
            warn!("dropping MESSAGE without subscription header");
            return;
        };
        let callback = {
            let state = self.inner.borrow();
            let Some(route) = state.routes.get(id) else {
                debug!("dropping message for inactive subscription {}", id);
                return;
            };
            if let Some(destination) = frame.header("destination")
                && destination != route.topic
            {
                warn!(
                    "dropping message for {}: destination {} does not match {}",
                    id, destination, route.topic
                );
                return;
            }
            route.callback.clone()
        };
        callback(&frame.body);
    }

    /// Register a connectivity listener. It stays registered until the
    /// returned guard is dropped.
    pub fn watch(&self, listener: impl Fn(bool) + 'static) -> ConnectivityWatch {
        let mut state = self.inner.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push((id, Rc::new(listener)));
        ConnectivityWatch {
            id,
            channel: Rc::downgrade(&self.inner),
        }
    }

    /// Topics with a live route, in no particular order.
    pub fn active_topics(&self) -> Vec<String> {
        self.inner
            .borrow()
            .routes
            .values()
            .map(|route| route.topic.clone())
            .collect()
    }

    fn notify(&self, connected: bool) {
        // Listeners may subscribe, so none may run under the borrow.
        let listeners: Vec<_> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(connected);
        }
    }
}

fn cancel_route(channel: &Rc<RefCell<ChannelState>>, id: &str) {
    let sink = {
        let mut state = channel.borrow_mut();
        if state.routes.remove(id).is_none() {
            return;
        }
        state.sink.clone()
    };
    debug!("unsubscribe {}", id);
    if let Some(sink) = sink {
        sink.send(&Frame::unsubscribe(id));
    }
}

/// One open subscription. Canceling is idempotent and also happens on drop.
pub struct SubscriptionHandle {
    id: String,
    topic: String,
    channel: Weak<RefCell<ChannelState>>,
    cancelled: Cell<bool>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Stop delivery. No callback for this subscription runs after return.
    pub fn cancel(&self) {
        if self.cancelled.replace(true) {
            return;
        }
        if let Some(channel) = self.channel.upgrade() {
            cancel_route(&channel, &self.id);
        }
    }

    /// Whether messages are still routed to this handle.
    pub fn is_active(&self) -> bool {
        !self.cancelled.get()
            && self
                .channel
                .upgrade()
                .is_some_and(|channel| channel.borrow().routes.contains_key(&self.id))
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("cancelled", &self.cancelled.get())
            .finish()
    }
}

/// Keeps a connectivity listener registered.
pub struct ConnectivityWatch {
    id: u64,
    channel: Weak<RefCell<ChannelState>>,
}

impl Drop for ConnectivityWatch {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}
