//! Console view state for one process at a time.
//!
//! A [`ConsoleSession`] ties together the log buffer, the status cell and a
//! [`SubscriptionManager`]. Opening a process releases the previous
//! process's subscriptions first, loads status and history, and only then
//! subscribes. Every open bumps a generation counter; loads that complete
//! for an older generation are discarded and never bind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::core::error::{InputError, SyncError};
use crate::core::log_buffer::LogBuffer;
use crate::core::push::PushChannel;
use crate::core::remote::{HttpTransport, Operation, RemoteClient};
use crate::core::subscriptions::{SubscriptionManager, Topic, TopicSpec};
use crate::models::{ControlAction, LogLine, Notice, ProcessStatus};

struct SessionState {
    process: Option<String>,
    generation: u64,
    buffer: LogBuffer,
    status: Option<ProcessStatus>,
    notice: Option<Notice>,
    manager: SubscriptionManager,
    observers: Vec<Rc<dyn Fn()>>,
}

/// Cloning shares the session.
#[derive(Clone)]
pub struct ConsoleSession<T> {
    client: RemoteClient<T>,
    state: Rc<RefCell<SessionState>>,
}

impl<T: HttpTransport> ConsoleSession<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(client: RemoteClient<T>, channel: PushChannel, capacity: usize) -> Self {
        Self {
            client,
            state: Rc::new(RefCell::new(SessionState {
                process: None,
                generation: 0,
                buffer: LogBuffer::new(capacity),
                status: None,
                notice: None,
                manager: SubscriptionManager::new(channel),
                observers: Vec::new(),
            })),
        }
    }

    /// Called after every state change. Observers must not call back into
    /// the session synchronously.
    pub fn observe(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().observers.push(Rc::new(observer));
    }

    pub fn process(&self) -> Option<String> {
        self.state.borrow().process.clone()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.state.borrow().buffer.snapshot()
    }

    pub fn texts(&self) -> Vec<String> {
        self.state.borrow().buffer.texts()
    }

    pub fn status(&self) -> Option<ProcessStatus> {
        self.state.borrow().status.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.borrow().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.borrow_mut().notice = None;
        self.notify();
    }

    /// Whether live subscriptions are open for the current process.
    pub fn is_live(&self) -> bool {
        self.state.borrow().manager.is_bound()
    }

    /// Switch the view to `process`.
    ///
    /// The previous process's subscriptions are canceled before anything
    /// else happens. Also used to retry after the push channel reconnects.
    pub async fn open(&self, process: &str) {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.manager.unbind();
            state.process = Some(process.to_string());
            state.buffer.clear();
            state.status = None;
            state.notice = None;
            state.generation
        };
        info!("console open {} (generation {})", process, generation);
        self.notify();

        let status = self.client.fetch_status(process).await;
        let history = self.client.fetch_console(process).await;

        if self.state.borrow().generation != generation {
            debug!("discarding stale console load for {}", process);
            return;
        }
        self.finish_open(process, generation, status, history);
        self.notify();
    }

    /// Release subscriptions and forget the process.
    pub fn close(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.manager.unbind();
            state.process = None;
            state.buffer.clear();
            state.status = None;
        }
        self.notify();
    }

    pub async fn control(&self, action: ControlAction) -> Result<(), SyncError> {
        let Some(process) = self.process() else {
            return Ok(());
        };
        let result = self.client.control(&process, action).await;
        self.record(Operation::from(action), &process, &result);
        result
    }

    pub async fn send_command(&self, command: &str) -> Result<(), SyncError> {
        let Some(process) = self.process() else {
            return Ok(());
        };
        let result = if command.trim().is_empty() {
            Err(InputError::EmptyCommand.into())
        } else {
            self.client.send_command(&process, command).await
        };
        self.record(Operation::SendCommand, &process, &result);
        result
    }

    fn finish_open(
        &self,
        process: &str,
        generation: u64,
        status: Result<ProcessStatus, SyncError>,
        history: Result<Vec<String>, SyncError>,
    ) {
        let weak = Rc::downgrade(&self.state);
        let mut state = self.state.borrow_mut();
        let mut topics = Vec::new();

        match status {
            Ok(status) => {
                state.status = Some(status);
                let weak = weak.clone();
                topics.push(TopicSpec::new(Topic::Status(process.to_string()), move |payload| {
                    update(&weak, generation, |state| {
                        state.status = Some(ProcessStatus::parse(payload));
                    });
                }));
            }
            Err(err) => {
                state.notice = Some(Notice::failure(Operation::FetchStatus, &err, process));
            }
        }

        match history {
            Ok(lines) => {
                state.buffer.reset(lines);
                topics.push(TopicSpec::new(Topic::Console(process.to_string()), move |payload| {
                    update(&weak, generation, |state| state.buffer.append(payload));
                }));
            }
            Err(err) => {
                state.notice = Some(Notice::failure(Operation::FetchConsole, &err, process));
            }
        }

        state.manager.bind(process, topics);
    }

    fn record(&self, op: Operation, process: &str, result: &Result<(), SyncError>) {
        if let Err(err) = result {
            self.state.borrow_mut().notice = Some(Notice::failure(op, err, process));
            self.notify();
        }
    }

    fn notify(&self) {
        let observers = self.state.borrow().observers.clone();
        notify_all(&observers);
    }
}

fn notify_all(observers: &[Rc<dyn Fn()>]) {
    for observer in observers {
        observer();
    }
}

/// Apply a push update if the session still exists and has not moved on.
fn update(
    weak: &Weak<RefCell<SessionState>>,
    generation: u64,
    apply: impl FnOnce(&mut SessionState),
) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let observers = {
        let mut state = state.borrow_mut();
        if state.generation != generation {
            return;
        }
        apply(&mut state);
        state.observers.clone()
    };
    notify_all(&observers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::push::testing::{connected_channel, message};
    use crate::core::remote::mock::MockTransport;
    use crate::core::stomp::Command;

    fn session(mock: &MockTransport, channel: &PushChannel, capacity: usize) -> ConsoleSession<MockTransport> {
        ConsoleSession::new(RemoteClient::new(mock.clone(), "/api"), channel.clone(), capacity)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_console_switch_between_processes() {
        let (channel, sink) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 2);

        mock.respond(200, "\"ONLINE\"");
        mock.respond(200, "[]");
        session.open("alpha").await;
        let alpha = sink.subscription_id("/topic/console/alpha").unwrap();
        for line in ["A", "B", "C"] {
            channel.deliver(&message(&alpha, "/topic/console/alpha", line));
        }
        assert_eq!(session.texts(), vec!["B", "C"]);

        let sent_before_switch = sink.frames.borrow().len();
        mock.respond(200, "\"OFFLINE\"");
        mock.respond(200, r#"["beta ready"]"#);
        session.open("beta").await;

        // Every alpha UNSUBSCRIBE precedes the first beta SUBSCRIBE.
        let switch: Vec<(Command, String)> = sink.frames.borrow()[sent_before_switch..]
            .iter()
            .map(|frame| {
                let topic = frame.header("destination").unwrap_or_default().to_string();
                (frame.command, topic)
            })
            .collect();
        assert_eq!(
            switch,
            vec![
                (Command::Unsubscribe, String::new()),
                (Command::Unsubscribe, String::new()),
                (Command::Subscribe, "/topic/status/beta".to_string()),
                (Command::Subscribe, "/topic/console/beta".to_string()),
            ]
        );

        channel.deliver(&message(&alpha, "/topic/console/alpha", "late alpha"));
        assert_eq!(session.texts(), vec!["beta ready"]);
        assert_eq!(session.status(), Some(ProcessStatus::Offline));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_status_push_updates_cell() {
        let (channel, sink) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"OFFLINE\"");
        mock.respond(200, "[]");
        session.open("alpha").await;

        let status = sink.subscription_id("/topic/status/alpha").unwrap();
        channel.deliver(&message(&status, "/topic/status/alpha", "ONLINE"));
        assert_eq!(session.status(), Some(ProcessStatus::Online));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_stale_load_does_not_bind() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);

        let release = mock.hold(200, "\"ONLINE\"");
        mock.respond(200, "\"OFFLINE\"");
        mock.respond(200, r#"["beta"]"#);
        mock.respond(200, r#"["alpha"]"#);

        tokio::join!(session.open("alpha"), async {
            session.open("beta").await;
            let _ = release.send(());
        });

        assert_eq!(session.process().as_deref(), Some("beta"));
        assert_eq!(session.texts(), vec!["beta"]);
        let mut topics = channel.active_topics();
        topics.sort();
        assert_eq!(topics, vec!["/topic/console/beta", "/topic/status/beta"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_history_skips_console_subscription() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"ONLINE\"");
        mock.respond(500, "");
        session.open("alpha").await;

        assert_eq!(channel.active_topics(), vec!["/topic/status/alpha"]);
        assert_eq!(
            session.notice().map(|notice| notice.text),
            Some("Could not get the console of the server.".to_string())
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_open_while_disconnected_loads_without_binding() {
        let channel = PushChannel::new();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"ONLINE\"");
        mock.respond(200, r#"["one"]"#);
        session.open("alpha").await;

        assert_eq!(session.texts(), vec!["one"]);
        assert!(!session.is_live());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_disconnect_ends_live_session() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"ONLINE\"");
        mock.respond(200, "[]");
        session.open("alpha").await;
        assert!(session.is_live());

        channel.detach();
        assert!(!session.is_live());
        assert_eq!(session.process().as_deref(), Some("alpha"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_control_failure_sets_notice() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"OFFLINE\"");
        mock.respond(200, "[]");
        session.open("alpha").await;

        mock.respond(500, "");
        let result = session.control(ControlAction::Start).await;
        assert!(result.is_err());
        assert_eq!(
            session.notice().unwrap().text,
            "The server alpha could not be started."
        );

        let sent = mock.requests().len();
        let result = session.send_command("   ").await;
        assert_eq!(
            result,
            Err(SyncError::InvalidInput(InputError::EmptyCommand))
        );
        assert_eq!(session.notice().unwrap().text, "The command is empty.");
        assert_eq!(mock.requests().len(), sent);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_close_releases_everything() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let session = session(&mock, &channel, 10);
        mock.respond(200, "\"ONLINE\"");
        mock.respond(200, "[]");
        session.open("alpha").await;
        session.close();
        assert!(channel.active_topics().is_empty());
        assert_eq!(session.process(), None);
    }
}
