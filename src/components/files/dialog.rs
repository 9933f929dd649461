//! Modal name prompt for create, rename and compress.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::components::icons as ic;
use crate::core::WorkspaceEvent;
use crate::models::{DialogKind, EntryKind, FormFeedback, NameForm};

stylance::import_crate_style!(css, "src/components/files/files.module.css");

/// The workspace event a confirmed dialog produces.
fn event_for(kind: &DialogKind, name: String) -> WorkspaceEvent {
    match kind {
        DialogKind::Rename { original } => WorkspaceEvent::Rename {
            path: original.clone(),
            new_name: name,
        },
        DialogKind::NewArchive => WorkspaceEvent::CompressSelected { archive_name: name },
        DialogKind::NewDirectory => WorkspaceEvent::CreateEntry {
            kind: EntryKind::Directory,
            name,
        },
        DialogKind::NewFile => WorkspaceEvent::CreateEntry {
            kind: EntryKind::File,
            name,
        },
    }
}

#[component]
pub fn NameDialog(
    dialog: RwSignal<Option<NameForm>>,
    dispatch: Callback<WorkspaceEvent>,
) -> impl IntoView {
    let close = move || dialog.set(None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let mut submitted = None;
        dialog.update(|form| {
            if let Some(form) = form
                && let Some(name) = form.submit()
            {
                submitted = Some(event_for(&form.kind, name));
            }
        });
        if let Some(event) = submitted {
            close();
            dispatch.run(event);
        }
    };

    let is_open = move || dialog.with(Option::is_some);
    let text = move || dialog.with(|form| form.as_ref().map(|form| form.kind.text()));
    let feedback = move || {
        dialog.with(|form| match form.as_ref().map(|form| &form.feedback) {
            Some(FormFeedback::Invalid(err)) => Some(err.to_string()),
            _ => None,
        })
    };

    view! {
        <Show when=is_open>
            <div class=css::overlay>
                <form class=css::dialog on:submit=on_submit>
                    <header class=css::dialogHeader>
                        <h3>{move || text().map(|t| t.title)}</h3>
                        <button type="button" class=css::iconButton on:click=move |_| close()>
                            <Icon icon=ic::CLOSE />
                        </button>
                    </header>
                    <label>
                        {move || text().map(|t| t.label)}
                        <input
                            type="text"
                            autofocus=true
                            prop:value=move || {
                                dialog.with(|form| form.as_ref().map(|f| f.value.clone()).unwrap_or_default())
                            }
                            on:input=move |ev| {
                                dialog.update(|form| {
                                    if let Some(form) = form {
                                        form.value = event_target_value(&ev);
                                    }
                                })
                            }
                        />
                    </label>
                    {move || feedback().map(|message| view! { <p class=css::invalid>{message}</p> })}
                    <button type="submit">{move || text().map(|t| t.submit)}</button>
                </form>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkspacePath;

    #[test]
    fn test_dialog_events() {
        assert_eq!(
            event_for(&DialogKind::NewDirectory, "backup".into()),
            WorkspaceEvent::CreateEntry {
                kind: EntryKind::Directory,
                name: "backup".into()
            }
        );
        assert_eq!(
            event_for(&DialogKind::NewArchive, "world".into()),
            WorkspaceEvent::CompressSelected {
                archive_name: "world".into()
            }
        );
        let original = WorkspacePath::parse("srv/old.txt").unwrap();
        assert_eq!(
            event_for(&DialogKind::Rename { original: original.clone() }, "new.txt".into()),
            WorkspaceEvent::Rename {
                path: original,
                new_name: "new.txt".into()
            }
        );
    }
}
