//! Typed operations against the remote service.

use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::contract::Operation;
use crate::core::error::SyncError;
use crate::models::{
    ControlAction, FileEntry, ProcessSettings, ProcessStatus, ProcessSummary, UploadFile,
    WorkspacePath,
};

/// Unreserved characters stay literal; "/" is kept readable in paths.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// =============================================================================
// Transport seam
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Multipart form with a single `file` field.
    Upload(UploadFile),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one request. Network-level failures come back as
/// [`SyncError::Transport`]; any received status is returned as-is.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SyncError>;
}

// =============================================================================
// Client
// =============================================================================

/// Remote Sync Layer. Never retries and never reloads anything itself.
#[derive(Clone, Debug)]
pub struct RemoteClient<T> {
    transport: T,
    api: String,
}

impl<T: HttpTransport> RemoteClient<T> {
    pub fn new(transport: T, api: impl Into<String>) -> Self {
        Self {
            transport,
            api: api.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Files
    // -------------------------------------------------------------------------

    /// Top-level directories of a process.
    pub async fn list_directories(&self, process: &str) -> Result<Vec<FileEntry>, SyncError> {
        let url = self.server_url(process, "directories", None);
        self.read_json(Operation::ListDirectories, url).await
    }

    pub async fn list(
        &self,
        process: &str,
        dir: &WorkspacePath,
    ) -> Result<Vec<FileEntry>, SyncError> {
        let url = self.server_url(process, "files", Some(dir));
        self.read_json(Operation::List, url).await
    }

    pub async fn create_directory(
        &self,
        process: &str,
        dir: &WorkspacePath,
        name: &str,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/newDirectory", Some(dir));
        let body = RequestBody::Json(json!({ "name": name }));
        self.execute(Operation::CreateDirectory, Method::Post, url, body)
            .await
    }

    pub async fn create_file(
        &self,
        process: &str,
        dir: &WorkspacePath,
        name: &str,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/newFile", Some(dir));
        let body = RequestBody::Json(json!({ "name": name }));
        self.execute(Operation::CreateFile, Method::Post, url, body)
            .await
    }

    pub async fn upload(
        &self,
        process: &str,
        dir: &WorkspacePath,
        file: UploadFile,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/upload", Some(dir));
        self.execute(Operation::Upload, Method::Post, url, RequestBody::Upload(file))
            .await
    }

    pub async fn rename(
        &self,
        process: &str,
        path: &WorkspacePath,
        new_name: &str,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files", Some(path));
        let body = RequestBody::Json(json!({ "newName": new_name }));
        self.execute(Operation::Rename, Method::Patch, url, body)
            .await
    }

    pub async fn delete(&self, process: &str, path: &WorkspacePath) -> Result<(), SyncError> {
        let url = self.server_url(process, "files", Some(path));
        self.execute(Operation::Delete, Method::Delete, url, RequestBody::Empty)
            .await
    }

    pub async fn delete_many(
        &self,
        process: &str,
        dir: &WorkspacePath,
        paths: &[WorkspacePath],
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/delete/multiple", Some(dir));
        self.execute(Operation::DeleteMany, Method::Post, url, files_body(paths))
            .await
    }

    /// Move one entry into `destination`.
    pub async fn move_one(
        &self,
        process: &str,
        source: &WorkspacePath,
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        self.transfer_one(Operation::Move, "files/move", process, source, destination)
            .await
    }

    pub async fn move_many(
        &self,
        process: &str,
        sources: &[WorkspacePath],
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/move/multiple", Some(destination));
        self.execute(Operation::MoveMany, Method::Post, url, files_body(sources))
            .await
    }

    /// Copy one entry into `destination`.
    pub async fn copy_one(
        &self,
        process: &str,
        source: &WorkspacePath,
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        self.transfer_one(Operation::Copy, "files/copy", process, source, destination)
            .await
    }

    pub async fn copy_many(
        &self,
        process: &str,
        sources: &[WorkspacePath],
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/copy/multiple", Some(destination));
        self.execute(Operation::CopyMany, Method::Post, url, files_body(sources))
            .await
    }

    /// Pack `paths` into the archive at `archive` (full path including ".zip").
    pub async fn compress(
        &self,
        process: &str,
        archive: &WorkspacePath,
        paths: &[WorkspacePath],
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/compress", Some(archive));
        self.execute(Operation::Compress, Method::Post, url, files_body(paths))
            .await
    }

    pub async fn decompress(
        &self,
        process: &str,
        archive: &WorkspacePath,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "files/decompress", Some(archive));
        self.execute(Operation::Decompress, Method::Post, url, RequestBody::Empty)
            .await
    }

    pub async fn fetch_content(
        &self,
        process: &str,
        path: &WorkspacePath,
    ) -> Result<String, SyncError> {
        let url = self.download_url(process, path);
        let response = self
            .send(Operation::FetchContent, Method::Get, url, RequestBody::Empty)
            .await?;
        Ok(response.body)
    }

    pub async fn save_content(
        &self,
        process: &str,
        path: &WorkspacePath,
        content: &str,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, "file", Some(path));
        let body = RequestBody::Json(json!({ "newContent": content }));
        self.execute(Operation::SaveContent, Method::Put, url, body)
            .await
    }

    /// URL for direct browser navigation; no request is made.
    pub fn download_url(&self, process: &str, path: &WorkspacePath) -> String {
        self.server_url(process, "file", Some(path))
    }

    // -------------------------------------------------------------------------
    // Processes
    // -------------------------------------------------------------------------

    pub async fn control(&self, process: &str, action: ControlAction) -> Result<(), SyncError> {
        let url = self.server_url(process, action.as_str(), None);
        self.execute(Operation::from(action), Method::Post, url, RequestBody::Empty)
            .await
    }

    pub async fn fetch_status(&self, process: &str) -> Result<ProcessStatus, SyncError> {
        let url = self.server_url(process, "status", None);
        let response = self
            .send(Operation::FetchStatus, Method::Get, url, RequestBody::Empty)
            .await?;
        Ok(ProcessStatus::parse(&response.body))
    }

    /// Console history, oldest line first.
    pub async fn fetch_console(&self, process: &str) -> Result<Vec<String>, SyncError> {
        let url = self.server_url(process, "console", None);
        self.read_json(Operation::FetchConsole, url).await
    }

    /// Send one console command as typed.
    pub async fn send_command(&self, process: &str, command: &str) -> Result<(), SyncError> {
        let url = self.server_url(process, "console", None);
        let body = RequestBody::Json(json!({ "command": command }));
        self.execute(Operation::SendCommand, Method::Post, url, body)
            .await
    }

    pub async fn list_processes(&self) -> Result<Vec<ProcessSummary>, SyncError> {
        let url = format!("{}/servers", self.api);
        self.read_json(Operation::ListProcesses, url).await
    }

    pub async fn fetch_settings(&self, process: &str) -> Result<ProcessSettings, SyncError> {
        let url = self.server_url(process, "info", None);
        self.read_json(Operation::FetchSettings, url).await
    }

    pub async fn create_process(
        &self,
        process: &str,
        settings: &ProcessSettings,
    ) -> Result<(), SyncError> {
        let url = self.servers_url("create", process);
        self.execute(Operation::CreateProcess, Method::Post, url, settings_body(settings)?)
            .await
    }

    pub async fn update_process(
        &self,
        process: &str,
        settings: &ProcessSettings,
    ) -> Result<(), SyncError> {
        let url = self.servers_url("edit", process);
        self.execute(Operation::UpdateProcess, Method::Patch, url, settings_body(settings)?)
            .await
    }

    pub async fn remove_process(&self, process: &str) -> Result<(), SyncError> {
        let url = self.servers_url("remove", process);
        self.execute(Operation::RemoveProcess, Method::Delete, url, RequestBody::Empty)
            .await
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    async fn transfer_one(
        &self,
        op: Operation,
        route: &str,
        process: &str,
        source: &WorkspacePath,
        destination: &WorkspacePath,
    ) -> Result<(), SyncError> {
        let url = self.server_url(process, route, Some(destination));
        let body = RequestBody::Json(json!({ "sourcePath": source.to_string() }));
        self.execute(op, Method::Post, url, body).await
    }

    async fn read_json<D: DeserializeOwned>(
        &self,
        op: Operation,
        url: String,
    ) -> Result<D, SyncError> {
        let response = self.send(op, Method::Get, url, RequestBody::Empty).await?;
        serde_json::from_str(&response.body).map_err(|err| {
            warn!("{:?}: unreadable response body: {}", op, err);
            SyncError::transport(format!("invalid response body: {}", err))
        })
    }

    async fn execute(
        &self,
        op: Operation,
        method: Method,
        url: String,
        body: RequestBody,
    ) -> Result<(), SyncError> {
        self.send(op, method, url, body).await.map(|_| ())
    }

    async fn send(
        &self,
        op: Operation,
        method: Method,
        url: String,
        body: RequestBody,
    ) -> Result<HttpResponse, SyncError> {
        debug!("{:?}: {} {}", op, method.as_str(), url);
        let response = self
            .transport
            .send(HttpRequest { method, url, body })
            .await
            .inspect_err(|err| warn!("{:?} failed: {}", op, err))?;
        op.contract()
            .classify(response.status)
            .inspect_err(|err| warn!("{:?} rejected: {}", op, err))?;
        Ok(response)
    }

    fn server_url(&self, process: &str, route: &str, path: Option<&WorkspacePath>) -> String {
        let mut url = format!(
            "{}/server/{}/{}",
            self.api,
            utf8_percent_encode(process, PATH_SEGMENT),
            route
        );
        if let Some(path) = path {
            url.push_str("?path=");
            url.extend(utf8_percent_encode(&path.to_string(), QUERY_VALUE));
        }
        url
    }

    fn servers_url(&self, action: &str, process: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.api,
            action,
            utf8_percent_encode(process, PATH_SEGMENT)
        )
    }
}

fn files_body(paths: &[WorkspacePath]) -> RequestBody {
    let files: Vec<String> = paths.iter().map(WorkspacePath::to_string).collect();
    RequestBody::Json(json!({ "files": files }))
}

fn settings_body(settings: &ProcessSettings) -> Result<RequestBody, SyncError> {
    serde_json::to_value(settings)
        .map(RequestBody::Json)
        .map_err(|err| SyncError::transport(format!("cannot encode settings: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockTransport;
    use super::*;

    fn path(raw: &str) -> WorkspacePath {
        WorkspacePath::parse(raw).unwrap()
    }

    fn client(mock: &MockTransport) -> RemoteClient<MockTransport> {
        RemoteClient::new(mock.clone(), "/api")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_list_decodes_entries() {
        let mock = MockTransport::new();
        mock.respond(
            200,
            r#"[{"name":"logs","directory":true,"size":0,"lastModified":1}]"#,
        );
        let entries = client(&mock).list("alpha", &path("srv")).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_directory);

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "/api/server/alpha/files?path=srv");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unreadable_listing_is_transport_failure() {
        let mock = MockTransport::new();
        mock.respond(200, "<html>");
        let result = client(&mock).list_directories("alpha").await;
        assert!(matches!(result, Err(SyncError::Transport(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_create_directory_conflict() {
        let mock = MockTransport::new();
        mock.respond(409, "");
        let result = client(&mock)
            .create_directory("alpha", &path("srv"), "backup")
            .await;
        assert_eq!(result, Err(SyncError::NameConflict));

        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "/api/server/alpha/files/newDirectory?path=srv");
        assert_eq!(request.body, RequestBody::Json(json!({ "name": "backup" })));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_query_values_are_percent_encoded() {
        let mock = MockTransport::new();
        mock.respond(204, "");
        client(&mock)
            .delete("my server", &path("srv/a b&c.txt"))
            .await
            .unwrap();
        assert_eq!(
            mock.last_request().unwrap().url,
            "/api/server/my%20server/files?path=srv/a%20b%26c.txt"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_batch_copy_body() {
        let mock = MockTransport::new();
        mock.respond(204, "");
        client(&mock)
            .copy_many(
                "alpha",
                &[path("srv/config.yml"), path("srv/logs")],
                &path("srv/backup"),
            )
            .await
            .unwrap();
        let request = mock.last_request().unwrap();
        assert_eq!(
            request.url,
            "/api/server/alpha/files/copy/multiple?path=srv/backup"
        );
        assert_eq!(
            request.body,
            RequestBody::Json(json!({ "files": ["srv/config.yml", "srv/logs"] }))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_move_one_sends_source_in_body() {
        let mock = MockTransport::new();
        mock.respond(409, "");
        let result = client(&mock)
            .move_one("alpha", &path("srv/a.txt"), &path("srv/old"))
            .await;
        assert_eq!(result, Err(SyncError::NameConflict));
        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "/api/server/alpha/files/move?path=srv/old");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({ "sourcePath": "srv/a.txt" }))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_control_statuses() {
        let mock = MockTransport::new();
        let client = client(&mock);

        mock.respond(204, "");
        assert_eq!(client.control("alpha", ControlAction::Start).await, Ok(()));
        assert_eq!(mock.last_request().unwrap().url, "/api/server/alpha/start");

        mock.respond(405, "");
        assert_eq!(
            client.control("alpha", ControlAction::Kill).await,
            Err(SyncError::PreconditionFailed)
        );

        mock.respond(404, "");
        assert_eq!(
            client.control("ghost", ControlAction::Stop).await,
            Err(SyncError::NotFound)
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_network_failure_passes_through() {
        let mock = MockTransport::new();
        mock.fail("connection refused");
        assert_eq!(
            client(&mock).fetch_status("alpha").await,
            Err(SyncError::transport("connection refused"))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_status_and_history() {
        let mock = MockTransport::new();
        let client = client(&mock);
        mock.respond(200, "\"ONLINE\"");
        assert_eq!(client.fetch_status("alpha").await, Ok(ProcessStatus::Online));

        mock.respond(200, r#"["[Server] Starting","[Server] Done"]"#);
        assert_eq!(
            client.fetch_console("alpha").await.unwrap(),
            vec!["[Server] Starting", "[Server] Done"]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_send_command_body() {
        let mock = MockTransport::new();
        mock.respond(204, "");
        assert_eq!(client(&mock).send_command("alpha", "say hi").await, Ok(()));
        let request = mock.last_request().unwrap();
        assert_eq!(request.url, "/api/server/alpha/console");
        assert_eq!(request.body, RequestBody::Json(json!({ "command": "say hi" })));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_process_admin_routes() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let settings = ProcessSettings {
            command: "./run.sh".into(),
            working_directory: "/srv/alpha".into(),
            ..Default::default()
        };

        mock.respond(404, "");
        assert_eq!(
            client.create_process("alpha", &settings).await,
            Err(SyncError::NotFound)
        );
        assert_eq!(
            mock.last_request().unwrap().url,
            "/api/servers/create/alpha"
        );

        mock.respond(204, "");
        client.update_process("alpha", &settings).await.unwrap();
        assert_eq!(mock.last_request().unwrap().method, Method::Patch);

        mock.respond(405, "");
        assert_eq!(
            client.remove_process("alpha").await,
            Err(SyncError::PreconditionFailed)
        );
    }

    #[test]
    fn test_download_url() {
        let client = RemoteClient::new(MockTransport::new(), "/api");
        assert_eq!(
            client.download_url("alpha", &path("srv/world.zip")),
            "/api/server/alpha/file?path=srv/world.zip"
        );
    }
}
