//! Managed process types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Run state of a supervised process, as reported by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessStatus {
    Online,
    Offline,
    Crashed,
    Restarting,
    /// A state this client does not know about.
    Other(String),
}

impl ProcessStatus {
    /// Parse the status text of a push message or a status response.
    ///
    /// Accepts both the bare name (`ONLINE`) and its JSON-string form (`"ONLINE"`).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().trim_matches('"') {
            "ONLINE" => Self::Online,
            "OFFLINE" => Self::Offline,
            "CRASHED" => Self::Crashed,
            "RESTARTING" => Self::Restarting,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn can_start(&self) -> bool {
        matches!(self, Self::Offline | Self::Crashed)
    }

    /// Stop, kill and restart are only offered while online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "ONLINE"),
            Self::Offline => write!(f, "OFFLINE"),
            Self::Crashed => write!(f, "CRASHED"),
            Self::Restarting => write!(f, "RESTARTING"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl<'de> Deserialize<'de> for ProcessStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Lifecycle command sent to a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
    Kill,
    Restart,
}

impl ControlAction {
    /// Route segment of the action endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Kill => "kill",
            Self::Restart => "restart",
        }
    }

    /// Whether the action is offered while the process is in `status`.
    pub fn available(self, status: &ProcessStatus) -> bool {
        match self {
            Self::Start => status.can_start(),
            Self::Stop | Self::Kill | Self::Restart => status.is_online(),
        }
    }

    /// Question to ask before sending the action to `process`, if any.
    pub fn confirmation(self, process: &str) -> Option<String> {
        match self {
            Self::Kill => Some(format!(
                "Kill {}? The process is terminated without a clean shutdown.",
                process
            )),
            Self::Start | Self::Stop | Self::Restart => None,
        }
    }
}

/// One row of the process list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProcessSummary {
    pub name: String,
    pub status: ProcessStatus,
}

/// Launch settings of a managed process, used by create and edit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSettings {
    pub command: String,
    pub working_directory: String,
    #[serde(default)]
    pub extra_directories: Vec<String>,
    /// Minimum milliseconds between crashes before auto-restart gives up.
    #[serde(default)]
    pub time_between_crashes: u64,
    #[serde(default)]
    pub restart_attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_json_string() {
        assert_eq!(ProcessStatus::parse("ONLINE"), ProcessStatus::Online);
        assert_eq!(ProcessStatus::parse("\"CRASHED\"\n"), ProcessStatus::Crashed);
        assert_eq!(
            ProcessStatus::parse("STARTING"),
            ProcessStatus::Other("STARTING".to_string())
        );
    }

    #[test]
    fn test_control_availability() {
        assert!(ProcessStatus::Offline.can_start());
        assert!(ProcessStatus::Crashed.can_start());
        assert!(!ProcessStatus::Online.can_start());
        assert!(!ProcessStatus::Restarting.can_start());
        assert!(ProcessStatus::Online.is_online());
        assert!(!ProcessStatus::Restarting.is_online());

        assert!(ControlAction::Start.available(&ProcessStatus::Crashed));
        assert!(!ControlAction::Kill.available(&ProcessStatus::Offline));
        assert!(ControlAction::Restart.available(&ProcessStatus::Online));
        assert_eq!(ControlAction::Kill.as_str(), "kill");
    }

    #[test]
    fn test_only_kill_asks_for_confirmation() {
        assert!(
            ControlAction::Kill
                .confirmation("alpha")
                .is_some_and(|text| text.starts_with("Kill alpha?"))
        );
        assert_eq!(ControlAction::Start.confirmation("alpha"), None);
        assert_eq!(ControlAction::Stop.confirmation("alpha"), None);
        assert_eq!(ControlAction::Restart.confirmation("alpha"), None);
    }

    #[test]
    fn test_summary_wire_format() {
        let rows: Vec<ProcessSummary> =
            serde_json::from_str(r#"[{"name":"alpha","status":"ONLINE"},{"name":"beta","status":"OFFLINE"}]"#)
                .unwrap();
        assert_eq!(rows[0].status, ProcessStatus::Online);
        assert_eq!(rows[1].name, "beta");
    }

    #[test]
    fn test_settings_wire_format() {
        let settings = ProcessSettings {
            command: "java -jar server.jar".into(),
            working_directory: "/srv/alpha".into(),
            extra_directories: vec!["/srv/backups".into()],
            time_between_crashes: 30_000,
            restart_attempts: 3,
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["workingDirectory"], "/srv/alpha");
        assert_eq!(json["timeBetweenCrashes"], 30_000);
        let back: ProcessSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }
}
