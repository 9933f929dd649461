//! Directory listing table.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::core::{Listing, Workspace, WorkspaceEvent};
use crate::models::{AppRoute, DialogKind, FileEntry, NameForm, OpenAction, WorkspacePath};
use crate::utils::{dom, format_modified, format_size};

stylance::import_crate_style!(css, "src/components/files/files.module.css");

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListingKind {
    Pending,
    NoValidRoot,
    Loaded,
}

#[component]
pub fn FileTable(
    process: String,
    state: RwSignal<Workspace>,
    dispatch: Callback<WorkspaceEvent>,
    dialog: RwSignal<Option<NameForm>>,
) -> impl IntoView {
    let rows = move || {
        state.with(|ws| match ws.listing() {
            Listing::Loaded { dir, entries } => {
                Some(
                    entries
                        .iter()
                        .cloned()
                        .map(|entry| (dir.clone(), entry))
                        .collect::<Vec<_>>(),
                )
            }
            _ => None,
        })
    };

    // Only a change of listing kind rebuilds the table; rows are diffed by `For`.
    let kind = Memo::new(move |_| {
        state.with(|ws| match ws.listing() {
            Listing::NotLoaded => ListingKind::Pending,
            Listing::NoValidRoot => ListingKind::NoValidRoot,
            Listing::Loaded { .. } => ListingKind::Loaded,
        })
    });

    view! {
        {move || match kind.get() {
            ListingKind::Pending => view! { <p class=css::empty>"Loading…"</p> }.into_any(),
            ListingKind::NoValidRoot => view! {
                <p class=css::empty>"This server has no directory that can be browsed."</p>
            }
            .into_any(),
            ListingKind::Loaded => {
                let process = process.clone();
                view! {
                    <table class=css::table>
                        <thead>
                            <tr>
                                <th></th>
                                <th>"Name"</th>
                                <th>"Size"</th>
                                <th>"Modified"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || rows().unwrap_or_default()
                                key=|(dir, entry)| {
                                    (dir.clone(), entry.name.clone(), entry.size, entry.last_modified)
                                }
                                children=move |(dir, entry)| view! {
                                    <FileRow
                                        process=process.clone()
                                        dir=dir
                                        entry=entry
                                        state=state
                                        dispatch=dispatch
                                        dialog=dialog
                                    />
                                }
                            />
                        </tbody>
                    </table>
                }
                .into_any()
            }
        }}
    }
}

#[component]
fn FileRow(
    process: String,
    dir: WorkspacePath,
    entry: FileEntry,
    state: RwSignal<Workspace>,
    dispatch: Callback<WorkspaceEvent>,
    dialog: RwSignal<Option<NameForm>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let Ok(path) = dir.join(&entry.name) else {
        return ().into_any();
    };

    let selectable = !dir.is_root();
    let checked = {
        let path = path.clone();
        move || state.with(|ws| ws.is_selected(&path))
    };
    let on_check = {
        let path = path.clone();
        move |ev: leptos::ev::Event| {
            dispatch.run(WorkspaceEvent::SelectionToggled {
                path: path.clone(),
                checked: event_target_checked(&ev),
            })
        }
    };

    let on_open = {
        let process = process.clone();
        let dir = dir.clone();
        let entry = entry.clone();
        move |_| match OpenAction::for_entry(&dir, &entry, ctx.config.inline_file_limit) {
            Ok(OpenAction::Browse(path)) => AppRoute::Files {
                name: process.clone(),
                path,
            }
            .push(),
            Ok(OpenAction::Edit(path)) => AppRoute::Edit {
                name: process.clone(),
                path,
            }
            .push(),
            Ok(OpenAction::Download(path)) => {
                dom::navigate_to(&ctx.client().download_url(&process, &path))
            }
            Err(err) => log::warn!("cannot open {}: {}", entry.name, err),
        }
    };

    let icon = if entry.is_directory {
        ic::FOLDER
    } else if entry.is_archive() {
        ic::ARCHIVE
    } else {
        ic::FILE
    };
    let size = if entry.is_directory {
        String::new()
    } else {
        format_size(entry.size)
    };

    view! {
        <tr>
            <td>
                {selectable.then(|| view! {
                    <input type="checkbox" prop:checked=checked on:change=on_check />
                })}
            </td>
            <td>
                <button class=css::entry on:click=on_open>
                    <Icon icon=icon />
                    <span>{entry.name.clone()}</span>
                </button>
            </td>
            <td class=css::size>{size}</td>
            <td class=css::modified>{format_modified(entry.last_modified)}</td>
            <td class=css::actions>
                {selectable.then(|| view! {
                    <RowActions
                        process=process
                        path=path
                        entry=entry.clone()
                        dispatch=dispatch
                        dialog=dialog
                    />
                })}
            </td>
        </tr>
    }
    .into_any()
}

#[component]
fn RowActions(
    process: String,
    path: WorkspacePath,
    entry: FileEntry,
    dispatch: Callback<WorkspaceEvent>,
    dialog: RwSignal<Option<NameForm>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let rename = {
        let original = path.clone();
        move |_| {
            dialog.set(Some(NameForm::open(DialogKind::Rename {
                original: original.clone(),
            })))
        }
    };
    let start_move = {
        let path = path.clone();
        move |_| dispatch.run(WorkspaceEvent::StartMove(path.clone()))
    };
    let start_copy = {
        let path = path.clone();
        move |_| dispatch.run(WorkspaceEvent::StartCopy(path.clone()))
    };
    let delete = {
        let path = path.clone();
        let name = entry.name.clone();
        move |_| {
            if dom::confirm(&format!("Delete {}?", name)) {
                dispatch.run(WorkspaceEvent::Delete(path.clone()));
            }
        }
    };
    let unzip = entry.is_archive().then(|| {
        let path = path.clone();
        view! {
            <button title="Unzip" on:click=move |_| dispatch.run(WorkspaceEvent::Decompress(path.clone()))>
                <Icon icon=ic::ARCHIVE />
            </button>
        }
    });
    let download = (!entry.is_directory).then(|| {
        let url = ctx.client().download_url(&process, &path);
        view! {
            <a title="Download" href=url download="">
                <Icon icon=ic::DOWNLOAD />
            </a>
        }
    });

    view! {
        <button title="Rename" on:click=rename>
            <Icon icon=ic::EDIT />
        </button>
        <button title="Move" on:click=start_move>
            <Icon icon=ic::CUT />
        </button>
        <button title="Copy" on:click=start_copy>
            <Icon icon=ic::COPY />
        </button>
        {unzip}
        {download}
        <button title="Delete" on:click=delete>
            <Icon icon=ic::TRASH />
        </button>
    }
}
