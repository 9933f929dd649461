//! Create/edit form for a managed process.

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::components::icons as ic;
use crate::models::{AppRoute, ProcessSettings};

use super::SharedList;

stylance::import_crate_style!(css, "src/components/processes/processes.module.css");

/// Raw text of every form field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SettingsDraft {
    name: String,
    command: String,
    working_directory: String,
    /// One directory per line.
    extra_directories: String,
    time_between_crashes: String,
    restart_attempts: String,
}

impl SettingsDraft {
    fn from_settings(name: &str, settings: &ProcessSettings) -> Self {
        Self {
            name: name.to_string(),
            command: settings.command.clone(),
            working_directory: settings.working_directory.clone(),
            extra_directories: settings.extra_directories.join("\n"),
            time_between_crashes: settings.time_between_crashes.to_string(),
            restart_attempts: settings.restart_attempts.to_string(),
        }
    }

    /// Numeric fields that do not parse fall back to zero.
    fn to_settings(&self) -> ProcessSettings {
        ProcessSettings {
            command: self.command.trim().to_string(),
            working_directory: self.working_directory.trim().to_string(),
            extra_directories: self
                .extra_directories
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            time_between_crashes: self.time_between_crashes.trim().parse().unwrap_or(0),
            restart_attempts: self.restart_attempts.trim().parse().unwrap_or(0),
        }
    }
}

/// `existing` is the name of the process being edited, `None` when creating.
#[component]
pub fn ProcessForm(existing: Option<String>, list: SharedList) -> impl IntoView {
    let draft = RwSignal::new(SettingsDraft {
        name: existing.clone().unwrap_or_default(),
        ..Default::default()
    });
    let busy = RwSignal::new(false);
    let is_edit = existing.is_some();

    if let Some(name) = existing.clone() {
        let list = list.get_value();
        spawn_local(async move {
            if let Ok(settings) = list.fetch_settings(&name).await {
                draft.try_set(SettingsDraft::from_settings(&name, &settings));
            }
        });
    }

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = draft.get_untracked();
        let list = list.get_value();
        busy.set(true);
        spawn_local(async move {
            let saved = list
                .save(&current.name, &current.to_settings(), is_edit)
                .await;
            busy.try_set(false);
            if saved.is_ok() {
                AppRoute::Processes.push();
            }
        });
    };

    let title = if is_edit { "Edit server" } else { "New server" };

    view! {
        <div class=css::overlay>
            <form class=css::form on:submit=on_submit>
                <header class=css::formHeader>
                    <h3>{title}</h3>
                    <a class=css::iconButton href=AppRoute::Processes.to_hash()>
                        <Icon icon=ic::CLOSE />
                    </a>
                </header>

                <label>
                    "Name"
                    <input
                        type="text"
                        disabled=is_edit
                        prop:value=move || draft.with(|d| d.name.clone())
                        on:input=move |ev| draft.update(|d| d.name = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Command"
                    <input
                        type="text"
                        prop:value=move || draft.with(|d| d.command.clone())
                        on:input=move |ev| draft.update(|d| d.command = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Working directory"
                    <input
                        type="text"
                        prop:value=move || draft.with(|d| d.working_directory.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.working_directory = event_target_value(&ev))
                        }
                    />
                </label>
                <label>
                    "Additional directories (one per line)"
                    <textarea
                        prop:value=move || draft.with(|d| d.extra_directories.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.extra_directories = event_target_value(&ev))
                        }
                    />
                </label>
                <label>
                    "Minimum time between crashes (ms)"
                    <input
                        type="number"
                        min="0"
                        prop:value=move || draft.with(|d| d.time_between_crashes.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.time_between_crashes = event_target_value(&ev))
                        }
                    />
                </label>
                <label>
                    "Restart attempts"
                    <input
                        type="number"
                        min="0"
                        prop:value=move || draft.with(|d| d.restart_attempts.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.restart_attempts = event_target_value(&ev))
                        }
                    />
                </label>

                <button class=css::button type="submit" disabled=move || busy.get()>
                    <Icon icon=ic::SAVE />
                    "Save"
                </button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_to_settings() {
        let draft = SettingsDraft {
            name: "alpha".into(),
            command: " ./start.sh ".into(),
            working_directory: "/srv/alpha".into(),
            extra_directories: "/srv/backups\n\n  /srv/shared  \n".into(),
            time_between_crashes: "30000".into(),
            restart_attempts: "three".into(),
        };
        let settings = draft.to_settings();
        assert_eq!(settings.command, "./start.sh");
        assert_eq!(settings.extra_directories, vec!["/srv/backups", "/srv/shared"]);
        assert_eq!(settings.time_between_crashes, 30_000);
        assert_eq!(settings.restart_attempts, 0);
    }

    #[test]
    fn test_draft_from_settings() {
        let settings = ProcessSettings {
            command: "java -jar server.jar".into(),
            working_directory: "/srv/alpha".into(),
            extra_directories: vec!["/a".into(), "/b".into()],
            time_between_crashes: 5,
            restart_attempts: 2,
        };
        let draft = SettingsDraft::from_settings("alpha", &settings);
        assert_eq!(draft.extra_directories, "/a\n/b");
        assert_eq!(draft.to_settings(), settings);
    }
}
