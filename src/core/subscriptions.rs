//! Per-view subscription lifecycle.
//!
//! A [`SubscriptionManager`] binds one resource key (a process name) to a
//! set of push topics. It owns the handles it opens, so a binding can never
//! outlive the view that created it.

use std::fmt;

use log::debug;

use crate::core::push::{PushCallback, PushChannel, SubscriptionHandle};

/// Push topics published by the service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Status text of one process.
    Status(String),
    /// Raw console lines of one process.
    Console(String),
}

impl Topic {
    pub fn destination(&self) -> String {
        match self {
            Self::Status(process) => format!("/topic/status/{}", process),
            Self::Console(process) => format!("/topic/console/{}", process),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.destination())
    }
}

/// A topic paired with the callback that receives its payloads.
pub struct TopicSpec {
    pub topic: Topic,
    pub callback: PushCallback,
}

impl TopicSpec {
    pub fn new(topic: Topic, callback: impl Fn(&str) + 'static) -> Self {
        Self {
            topic,
            callback: std::rc::Rc::new(callback),
        }
    }
}

pub struct SubscriptionManager {
    channel: PushChannel,
    resource: Option<String>,
    handles: Vec<SubscriptionHandle>,
}

impl SubscriptionManager {
    pub fn new(channel: PushChannel) -> Self {
        Self {
            channel,
            resource: None,
            handles: Vec::new(),
        }
    }

    /// Open one subscription per topic for `resource_key`.
    ///
    /// Any previous binding is released first. On a disconnected channel
    /// nothing is opened and the returned slice is empty; the resource key
    /// is still recorded so a later `rebind` can retry.
    pub fn bind(&mut self, resource_key: &str, topics: Vec<TopicSpec>) -> &[SubscriptionHandle] {
        self.unbind();
        self.resource = Some(resource_key.to_string());
        self.handles = topics
            .into_iter()
            .filter_map(|spec| {
                self.channel
                    .subscribe(&spec.topic.destination(), spec.callback)
            })
            .collect();
        debug!(
            "bound {} to {} subscriptions",
            resource_key,
            self.handles.len()
        );
        &self.handles
    }

    /// Cancel every current handle, then bind the new resource.
    ///
    /// Cancellation removes the old routes before the first new
    /// subscription exists, so no old payload is processed afterwards.
    pub fn rebind(&mut self, resource_key: &str, topics: Vec<TopicSpec>) -> &[SubscriptionHandle] {
        self.bind(resource_key, topics)
    }

    /// Cancel every handle. Idempotent.
    pub fn unbind(&mut self) {
        if self.handles.is_empty() && self.resource.is_none() {
            return;
        }
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
        if let Some(resource) = self.resource.take() {
            debug!("unbound {}", resource);
        }
    }

    pub fn resource_key(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn handles(&self) -> &[SubscriptionHandle] {
        &self.handles
    }

    /// Whether any held subscription is still routed by the channel.
    pub fn is_bound(&self) -> bool {
        self.handles.iter().any(SubscriptionHandle::is_active)
    }

    pub fn channel(&self) -> &PushChannel {
        &self.channel
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::push::testing::{collector, connected_channel, message};
    use crate::core::stomp::Command;

    #[test]
    fn test_topic_destinations() {
        assert_eq!(
            Topic::Status("alpha".into()).destination(),
            "/topic/status/alpha"
        );
        assert_eq!(
            Topic::Console("alpha".into()).to_string(),
            "/topic/console/alpha"
        );
    }

    #[test]
    fn test_bind_on_disconnected_channel_is_empty() {
        let mut manager = SubscriptionManager::new(PushChannel::new());
        let (callback, _) = collector();
        let handles = manager.bind(
            "alpha",
            vec![TopicSpec {
                topic: Topic::Console("alpha".into()),
                callback,
            }],
        );
        assert!(handles.is_empty());
        assert_eq!(manager.resource_key(), Some("alpha"));
        assert!(!manager.is_bound());
    }

    #[test]
    fn test_bind_opens_one_subscription_per_topic() {
        let (channel, sink) = connected_channel();
        let mut manager = SubscriptionManager::new(channel);
        let (status, _) = collector();
        let (console, _) = collector();
        let handles = manager.bind(
            "alpha",
            vec![
                TopicSpec {
                    topic: Topic::Status("alpha".into()),
                    callback: status,
                },
                TopicSpec {
                    topic: Topic::Console("alpha".into()),
                    callback: console,
                },
            ],
        );
        assert_eq!(handles.len(), 2);
        assert_eq!(
            sink.subscribed_topics(),
            vec!["/topic/status/alpha", "/topic/console/alpha"]
        );
    }

    #[test]
    fn test_rebind_drops_in_flight_messages_for_old_topic() {
        let (channel, sink) = connected_channel();
        let mut manager = SubscriptionManager::new(channel.clone());
        let (alpha, alpha_seen) = collector();
        let (beta, beta_seen) = collector();

        let old_id = manager.bind(
            "alpha",
            vec![TopicSpec {
                topic: Topic::Console("alpha".into()),
                callback: alpha,
            }],
        )[0]
        .id()
        .to_string();

        let new_id = manager.rebind(
            "beta",
            vec![TopicSpec {
                topic: Topic::Console("beta".into()),
                callback: beta,
            }],
        )[0]
        .id()
        .to_string();

        // A frame for the old subscription arriving after the switch.
        channel.deliver(&message(&old_id, "/topic/console/alpha", "late alpha"));
        channel.deliver(&message(&new_id, "/topic/console/beta", "beta line"));

        assert!(alpha_seen.borrow().is_empty());
        assert_eq!(*beta_seen.borrow(), vec!["beta line"]);
        assert_eq!(manager.resource_key(), Some("beta"));
        assert_eq!(channel.active_topics(), vec!["/topic/console/beta"]);

        let commands: Vec<Command> = sink.log().into_iter().map(|(command, _)| command).collect();
        assert_eq!(
            commands,
            vec![Command::Subscribe, Command::Unsubscribe, Command::Subscribe]
        );
    }

    #[test]
    fn test_disconnect_leaves_manager_unbound() {
        let (channel, _) = connected_channel();
        let mut manager = SubscriptionManager::new(channel.clone());
        manager.bind(
            "alpha",
            vec![TopicSpec::new(Topic::Status("alpha".into()), |_| {})],
        );
        assert!(manager.is_bound());

        channel.detach();
        assert!(!manager.is_bound());
        assert_eq!(manager.resource_key(), Some("alpha"));
    }

    #[test]
    fn test_unbind_is_idempotent() {
        let (channel, sink) = connected_channel();
        let mut manager = SubscriptionManager::new(channel.clone());
        let (callback, _) = collector();
        manager.bind(
            "alpha",
            vec![TopicSpec {
                topic: Topic::Status("alpha".into()),
                callback,
            }],
        );
        manager.unbind();
        manager.unbind();
        assert!(channel.active_topics().is_empty());
        assert_eq!(manager.resource_key(), None);
        assert_eq!(sink.log().len(), 2);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let (channel, _) = connected_channel();
        let seen = Rc::new(RefCell::new(0));
        {
            let mut manager = SubscriptionManager::new(channel.clone());
            let seen = seen.clone();
            manager.bind(
                "alpha",
                vec![TopicSpec::new(Topic::Status("alpha".into()), move |_| {
                    *seen.borrow_mut() += 1
                })],
            );
            assert_eq!(channel.active_topics().len(), 1);
        }
        assert!(channel.active_topics().is_empty());
        channel.deliver(&message("sub-0", "/topic/status/alpha", "ONLINE"));
        assert_eq!(*seen.borrow(), 0);
    }
}
