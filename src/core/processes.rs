//! Process list with live status cells.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::core::error::{InputError, SyncError};
use crate::core::push::PushChannel;
use crate::core::remote::{HttpTransport, Operation, RemoteClient};
use crate::core::subscriptions::{SubscriptionManager, Topic, TopicSpec};
use crate::models::{
    ControlAction, Notice, ProcessSettings, ProcessStatus, ProcessSummary, validate_name,
};

/// Resource key of the list binding.
const LIST_KEY: &str = "processes";

struct ListState {
    generation: u64,
    rows: Vec<ProcessSummary>,
    notice: Option<Notice>,
    manager: SubscriptionManager,
    observers: Vec<Rc<dyn Fn()>>,
}

/// All managed processes, each row's status kept current by its own
/// status subscription. Cloning shares the list.
#[derive(Clone)]
pub struct ProcessList<T> {
    client: RemoteClient<T>,
    state: Rc<RefCell<ListState>>,
}

impl<T: HttpTransport> ProcessList<T> {
    pub fn new(client: RemoteClient<T>, channel: PushChannel) -> Self {
        Self {
            client,
            state: Rc::new(RefCell::new(ListState {
                generation: 0,
                rows: Vec::new(),
                notice: None,
                manager: SubscriptionManager::new(channel),
                observers: Vec::new(),
            })),
        }
    }

    pub fn observe(&self, observer: impl Fn() + 'static) {
        self.state.borrow_mut().observers.push(Rc::new(observer));
    }

    pub fn rows(&self) -> Vec<ProcessSummary> {
        self.state.borrow().rows.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.borrow().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.borrow_mut().notice = None;
        self.notify();
    }

    /// Fetch the list and resubscribe every row.
    pub async fn load(&self) {
        let generation = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.manager.unbind();
            state.generation
        };

        let result = self.client.list_processes().await;
        if self.state.borrow().generation != generation {
            debug!("discarding stale process list");
            return;
        }

        match result {
            Ok(rows) => self.bind_rows(rows, generation),
            Err(err) => {
                self.state.borrow_mut().notice =
                    Some(Notice::failure(Operation::ListProcesses, &err, ""));
            }
        }
        self.notify();
    }

    /// Release every status subscription.
    pub fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.manager.unbind();
    }

    pub async fn fetch_settings(&self, name: &str) -> Result<ProcessSettings, SyncError> {
        let result = self.client.fetch_settings(name).await;
        if let Err(err) = &result {
            self.set_notice(Notice::failure(Operation::FetchSettings, err, name));
        }
        result
    }

    /// Create a new process, or update an existing one when `existing` is set.
    pub async fn save(
        &self,
        name: &str,
        settings: &ProcessSettings,
        existing: bool,
    ) -> Result<(), SyncError> {
        let op = if existing {
            Operation::UpdateProcess
        } else {
            Operation::CreateProcess
        };
        let result = match validate_settings(name, settings) {
            Err(err) => Err(err.into()),
            Ok(()) if existing => self.client.update_process(name, settings).await,
            Ok(()) => self.client.create_process(name, settings).await,
        };
        self.finish(op, name, &result).await;
        result
    }

    /// Send a lifecycle action to one process. The new status arrives on the
    /// row's status subscription.
    pub async fn control(&self, name: &str, action: ControlAction) -> Result<(), SyncError> {
        let op = Operation::from(action);
        let result = self.client.control(name, action).await;
        match &result {
            Ok(()) => debug!("{:?} {} accepted", op, name),
            Err(err) => self.set_notice(Notice::failure(op, err, name)),
        }
        result
    }

    pub async fn remove(&self, name: &str) -> Result<(), SyncError> {
        let result = self.client.remove_process(name).await;
        self.finish(Operation::RemoveProcess, name, &result).await;
        result
    }

    async fn finish(&self, op: Operation, name: &str, result: &Result<(), SyncError>) {
        match result {
            Ok(()) => {
                info!("{:?} {} succeeded", op, name);
                if let Some(notice) = Notice::success_for(op) {
                    self.set_notice(notice);
                }
                self.load().await;
            }
            Err(err) => self.set_notice(Notice::failure(op, err, name)),
        }
    }

    fn bind_rows(&self, rows: Vec<ProcessSummary>, generation: u64) {
        let weak = Rc::downgrade(&self.state);
        let topics: Vec<TopicSpec> = rows
            .iter()
            .map(|row| {
                let weak = weak.clone();
                let name = row.name.clone();
                TopicSpec::new(Topic::Status(row.name.clone()), move |payload| {
                    set_status(&weak, generation, &name, ProcessStatus::parse(payload));
                })
            })
            .collect();

        let mut state = self.state.borrow_mut();
        state.rows = rows;
        state.manager.bind(LIST_KEY, topics);
    }

    fn set_notice(&self, notice: Notice) {
        self.state.borrow_mut().notice = Some(notice);
        self.notify();
    }

    fn notify(&self) {
        let observers = self.state.borrow().observers.clone();
        for observer in observers {
            observer();
        }
    }
}

fn validate_settings(name: &str, settings: &ProcessSettings) -> Result<(), InputError> {
    validate_name(name)?;
    if settings.command.trim().is_empty() {
        return Err(InputError::EmptyCommand);
    }
    if settings.working_directory.trim().is_empty() {
        return Err(InputError::EmptyWorkingDirectory);
    }
    Ok(())
}

fn set_status(weak: &Weak<RefCell<ListState>>, generation: u64, name: &str, status: ProcessStatus) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let observers = {
        let mut state = state.borrow_mut();
        if state.generation != generation {
            return;
        }
        let Some(row) = state.rows.iter_mut().find(|row| row.name == name) else {
            return;
        };
        row.status = status;
        state.observers.clone()
    };
    for observer in observers {
        observer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::push::testing::{connected_channel, message};
    use crate::core::remote::mock::MockTransport;

    const TWO_ROWS: &str = r#"[{"name":"alpha","status":"ONLINE"},{"name":"beta","status":"OFFLINE"}]"#;

    fn list(mock: &MockTransport, channel: &PushChannel) -> ProcessList<MockTransport> {
        ProcessList::new(RemoteClient::new(mock.clone(), "/api"), channel.clone())
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_one_status_subscription_per_row() {
        let (channel, sink) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        mock.respond(200, TWO_ROWS);
        list.load().await;

        assert_eq!(
            sink.subscribed_topics(),
            vec!["/topic/status/alpha", "/topic/status/beta"]
        );

        let beta = sink.subscription_id("/topic/status/beta").unwrap();
        channel.deliver(&message(&beta, "/topic/status/beta", "RESTARTING"));
        let rows = list.rows();
        assert_eq!(rows[0].status, ProcessStatus::Online);
        assert_eq!(rows[1].status, ProcessStatus::Restarting);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_reload_replaces_subscriptions() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        mock.respond(200, TWO_ROWS);
        list.load().await;
        mock.respond(200, r#"[{"name":"gamma","status":"CRASHED"}]"#);
        list.load().await;

        assert_eq!(channel.active_topics(), vec!["/topic/status/gamma"]);
        assert!(list.rows()[0].status.can_start());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_remove_online_process() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        mock.respond(405, "");
        let result = list.remove("alpha").await;
        assert_eq!(result, Err(SyncError::PreconditionFailed));
        assert!(list.notice().unwrap().text.contains("needs to be shut down"));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_reloads_and_announces() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        let settings = ProcessSettings {
            command: "./run.sh".into(),
            working_directory: "/srv/gamma".into(),
            ..Default::default()
        };
        mock.respond(204, "");
        mock.respond(200, r#"[{"name":"gamma","status":"OFFLINE"}]"#);
        list.save("gamma", &settings, false).await.unwrap();

        assert_eq!(
            mock.request_lines(),
            vec!["POST /api/servers/create/gamma", "GET /api/servers"]
        );
        assert_eq!(
            list.notice().unwrap().text,
            "The server has been created."
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_invalid_settings_are_rejected_locally() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        let result = list.save("gamma", &ProcessSettings::default(), false).await;
        assert_eq!(
            result,
            Err(SyncError::InvalidInput(InputError::EmptyCommand))
        );
        assert!(mock.requests().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blank_working_directory_is_rejected() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);
        let settings = ProcessSettings {
            command: "./run.sh".into(),
            working_directory: "  ".into(),
            ..Default::default()
        };
        let result = list.save("gamma", &settings, true).await;
        assert_eq!(
            result,
            Err(SyncError::InvalidInput(InputError::EmptyWorkingDirectory))
        );
        assert_eq!(
            list.notice().unwrap().text,
            "The working directory is required."
        );
        assert!(mock.requests().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_row_control_reports_failure() {
        let (channel, _) = connected_channel();
        let mock = MockTransport::new();
        let list = list(&mock, &channel);

        mock.respond(204, "");
        assert_eq!(list.control("alpha", ControlAction::Stop).await, Ok(()));
        assert!(list.notice().is_none());

        mock.respond(500, "");
        let result = list.control("alpha", ControlAction::Kill).await;
        assert!(result.is_err());
        assert_eq!(
            list.notice().unwrap().text,
            "The server alpha could not be killed."
        );
        assert_eq!(
            mock.request_lines(),
            vec!["POST /api/server/alpha/stop", "POST /api/server/alpha/kill"]
        );
    }
}
