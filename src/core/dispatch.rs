//! Single-threaded dispatcher between the workspace and the remote service.
//!
//! Every event is applied to the [`Workspace`] to completion, observers are
//! notified, and the resulting effects run against the [`RemoteClient`].
//! Each completion is fed back as another event. The workspace borrow is
//! never held across an await, so several `run` calls can interleave on
//! the browser's event loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;

use crate::core::error::SyncError;
use crate::core::remote::{HttpTransport, RemoteClient};
use crate::core::workspace::{ClipboardOp, Effect, Mutation, Scope, Workspace, WorkspaceEvent};
use crate::models::{EntryKind, WorkspacePath};

type Observer = Rc<dyn Fn(&Workspace)>;

#[derive(Clone)]
pub struct Dispatcher<T> {
    client: RemoteClient<T>,
    workspace: Rc<RefCell<Workspace>>,
    observers: Rc<RefCell<Vec<Observer>>>,
}

impl<T: HttpTransport> Dispatcher<T> {
    pub fn new(client: RemoteClient<T>, workspace: Workspace) -> Self {
        Self {
            client,
            workspace: Rc::new(RefCell::new(workspace)),
            observers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Called with the workspace after every applied event. Observers run
    /// under a shared borrow and must not dispatch synchronously.
    pub fn observe(&self, observer: impl Fn(&Workspace) + 'static) {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Workspace {
        self.workspace.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&Workspace) -> R) -> R {
        f(&self.workspace.borrow())
    }

    pub fn dismiss_notice(&self) {
        self.workspace.borrow_mut().dismiss_notice();
        self.notify();
    }

    /// Issue the initial load.
    pub async fn start(&self) {
        let effects = self.workspace.borrow_mut().open();
        self.notify();
        self.drive(effects).await;
    }

    /// Apply `event` and carry out everything that follows from it.
    pub async fn run(&self, event: WorkspaceEvent) {
        let effects = self.apply(event);
        self.drive(effects).await;
    }

    fn apply(&self, event: WorkspaceEvent) -> Vec<Effect> {
        let outcome = self.workspace.borrow_mut().handle(event);
        self.notify();
        outcome.unwrap_or_else(|err| {
            debug!("event rejected: {}", err);
            Vec::new()
        })
    }

    fn notify(&self) {
        let observers: Vec<Observer> = self.observers.borrow().clone();
        let workspace = self.workspace.borrow();
        for observer in observers {
            observer(&workspace);
        }
    }

    async fn drive(&self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let completion = self.perform(effect).await;
            queue.extend(self.apply(completion));
        }
    }

    async fn perform(&self, effect: Effect) -> WorkspaceEvent {
        let process = self.workspace.borrow().process().to_string();
        match effect {
            Effect::Load(path) => {
                let result = if path.is_root() {
                    self.client.list_directories(&process).await
                } else {
                    self.client.list(&process, &path).await
                };
                WorkspaceEvent::ListingLoaded { path, result }
            }
            Effect::Mutate(mutation) => {
                let result = self.execute(&process, &mutation).await;
                WorkspaceEvent::MutationFinished { mutation, result }
            }
        }
    }

    async fn execute(&self, process: &str, mutation: &Mutation) -> Result<(), SyncError> {
        let client = &self.client;
        match mutation {
            Mutation::Create {
                kind: EntryKind::Directory,
                dir,
                name,
            } => client.create_directory(process, dir, name).await,
            Mutation::Create {
                kind: EntryKind::File,
                dir,
                name,
            } => client.create_file(process, dir, name).await,
            Mutation::Upload { dir, file } => client.upload(process, dir, file.clone()).await,
            Mutation::Rename { path, new_name } => client.rename(process, path, new_name).await,
            Mutation::Delete(path) => client.delete(process, path).await,
            Mutation::DeleteMany { dir, paths } => client.delete_many(process, dir, paths).await,
            Mutation::Transfer { op, destination } => {
                self.transfer(process, op, destination).await
            }
            Mutation::Compress { archive, paths } => {
                client.compress(process, archive, paths).await
            }
            Mutation::Decompress(path) => client.decompress(process, path).await,
        }
    }

    async fn transfer(
        &self,
        process: &str,
        op: &ClipboardOp,
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        let client = &self.client;
        match op {
            ClipboardOp::Move(Scope::Single(source)) => {
                client.move_one(process, source, destination).await
            }
            ClipboardOp::Copy(Scope::Single(source)) => {
                client.copy_one(process, source, destination).await
            }
            ClipboardOp::Move(scope @ Scope::Batch(_)) => {
                client.move_many(process, &scope.paths(), destination).await
            }
            ClipboardOp::Copy(scope @ Scope::Batch(_)) => {
                client.copy_many(process, &scope.paths(), destination).await
            }
        }
    }
}
