//! File manager page for one process.
//!
//! All state lives in the [`Workspace`] behind a [`Dispatcher`]; the view
//! mirrors it into a signal and turns clicks into [`WorkspaceEvent`]s. The
//! URL hash and the workspace directory are kept in step both ways.

mod dialog;
mod table;

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeBar;
use crate::core::workspace::ClipboardOp;
use crate::core::{Dispatcher, Workspace, WorkspaceEvent};
use crate::models::{AppRoute, DialogKind, NameForm, WorkspacePath};
use crate::utils::{FetchTransport, dom, read_upload};

use dialog::NameDialog;
use table::FileTable;

stylance::import_crate_style!(css, "src/components/files/files.module.css");

type SharedDispatcher = StoredValue<Dispatcher<FetchTransport>, LocalStorage>;

#[component]
pub fn FilesView(process: String) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let start = match ctx.route.get_untracked() {
        AppRoute::Files { path, .. } => path,
        _ => WorkspacePath::root(),
    };
    let dispatcher = Dispatcher::new(ctx.client(), Workspace::new(process.clone(), start));
    let state = RwSignal::new(dispatcher.snapshot());
    dispatcher.observe(move |workspace| {
        state.try_set(workspace.clone());
    });
    let dispatcher: SharedDispatcher = StoredValue::new_local(dispatcher);

    {
        let dispatcher = dispatcher.get_value();
        spawn_local(async move { dispatcher.start().await });
    }

    let dispatch = Callback::new(move |event: WorkspaceEvent| {
        let dispatcher = dispatcher.get_value();
        spawn_local(async move { dispatcher.run(event).await });
    });

    // Route -> workspace.
    Effect::new(move |_| {
        if let AppRoute::Files { path, .. } = ctx.route.get()
            && state.with_untracked(|ws| *ws.directory() != path)
        {
            dispatch.run(WorkspaceEvent::Navigate(path));
        }
    });

    // Workspace -> route, for directories entered without a click.
    {
        let process = process.clone();
        Effect::new(move |_| {
            let directory = state.with(|ws| ws.directory().clone());
            if let AppRoute::Files { path, .. } = ctx.route.get_untracked()
                && path != directory
            {
                AppRoute::Files {
                    name: process.clone(),
                    path: directory,
                }
                .push();
            }
        });
    }

    let dialog = RwSignal::new(None::<NameForm>);
    let notice = Signal::derive(move || state.with(|ws| ws.notice().cloned()));
    let on_dismiss = Callback::new(move |_: ()| dispatcher.with_value(|d| d.dismiss_notice()));

    view! {
        <section class=css::page>
            <Breadcrumbs process=process.clone() state=state />
            <Toolbar state=state dispatch=dispatch dialog=dialog />
            <SelectionBar state=state dispatch=dispatch dialog=dialog />
            <ClipboardBar state=state dispatch=dispatch />
            <FileTable process=process state=state dispatch=dispatch dialog=dialog />
            <NameDialog dialog=dialog dispatch=dispatch />
            <NoticeBar notice=notice on_dismiss=on_dismiss />
        </section>
    }
}

#[component]
fn Breadcrumbs(process: String, state: RwSignal<Workspace>) -> impl IntoView {
    let root = AppRoute::Files {
        name: process.clone(),
        path: WorkspacePath::root(),
    }
    .to_hash();

    view! {
        <nav class=css::breadcrumbs>
            <a href=root>
                <Icon icon=ic::HOME />
            </a>
            {move || {
                state
                    .with(|ws| ws.directory().breadcrumbs())
                    .into_iter()
                    .map(|(label, path)| {
                        let href = AppRoute::Files {
                            name: process.clone(),
                            path,
                        }
                        .to_hash();
                        view! {
                            <Icon icon=ic::CHEVRON_RIGHT />
                            <a href=href>{label}</a>
                        }
                    })
                    .collect_view()
            }}
        </nav>
    }
}

#[component]
fn Toolbar(
    state: RwSignal<Workspace>,
    dispatch: Callback<WorkspaceEvent>,
    dialog: RwSignal<Option<NameForm>>,
) -> impl IntoView {
    let at_root = move || state.with(|ws| ws.directory().is_root());
    let open = move |kind: DialogKind| dialog.set(Some(NameForm::open(kind)));

    let on_upload = move |ev: leptos::ev::Event| {
        for file in dom::take_picked_files(&ev) {
            spawn_local(async move {
                match read_upload(file).await {
                    Ok(upload) => dispatch.run(WorkspaceEvent::Upload(upload)),
                    Err(err) => log::warn!("cannot read upload: {}", err),
                }
            });
        }
    };

    view! {
        <div class=css::toolbar>
            <button disabled=at_root on:click=move |_| open(DialogKind::NewDirectory)>
                <Icon icon=ic::NEW_FOLDER />
                "New directory"
            </button>
            <button disabled=at_root on:click=move |_| open(DialogKind::NewFile)>
                <Icon icon=ic::NEW_FILE />
                "New file"
            </button>
            <label class=move || {
                if at_root() {
                    format!("{} {}", css::upload, css::disabled)
                } else {
                    css::upload.to_string()
                }
            }>
                <Icon icon=ic::UPLOAD />
                "Upload"
                <input type="file" multiple=true disabled=at_root on:change=on_upload />
            </label>
            <button on:click=move |_| dispatch.run(WorkspaceEvent::Refresh)>
                <Icon icon=ic::REFRESH />
                "Refresh"
            </button>
            <Show when=move || state.with(|ws| ws.is_loading() || ws.pending() > 0)>
                <span class=css::busy>"Working…"</span>
            </Show>
        </div>
    }
}

/// Batch actions on the checked entries.
#[component]
fn SelectionBar(
    state: RwSignal<Workspace>,
    dispatch: Callback<WorkspaceEvent>,
    dialog: RwSignal<Option<NameForm>>,
) -> impl IntoView {
    let count = move || state.with(|ws| ws.selection().len());

    let on_delete = move |_| {
        if dom::confirm(&format!("Delete {} selected item(s)?", count())) {
            dispatch.run(WorkspaceEvent::DeleteSelected);
        }
    };

    view! {
        <Show when=move || (count() > 0)>
            <div class=css::bar>
                <span>{move || format!("{} selected", count())}</span>
                <button on:click=move |_| dispatch.run(WorkspaceEvent::StartMoveSelected)>
                    <Icon icon=ic::CUT />
                    "Move"
                </button>
                <button on:click=move |_| dispatch.run(WorkspaceEvent::StartCopySelected)>
                    <Icon icon=ic::COPY />
                    "Copy"
                </button>
                <button on:click=move |_| dialog.set(Some(NameForm::open(DialogKind::NewArchive)))>
                    <Icon icon=ic::ARCHIVE />
                    "Compress"
                </button>
                <button on:click=on_delete>
                    <Icon icon=ic::TRASH />
                    "Delete"
                </button>
            </div>
        </Show>
    }
}

/// Pending move or copy, pasted into whichever directory is open.
#[component]
fn ClipboardBar(state: RwSignal<Workspace>, dispatch: Callback<WorkspaceEvent>) -> impl IntoView {
    let summary = move || {
        state.with(|ws| {
            ws.clipboard().map(|op| {
                let verb = match op {
                    ClipboardOp::Move(_) => "move",
                    ClipboardOp::Copy(_) => "copy",
                };
                format!("{} item(s) to {}", op.scope().len(), verb)
            })
        })
    };

    view! {
        {move || summary().map(|text| view! {
            <div class=css::bar>
                <span>{text}</span>
                <button
                    disabled=move || state.with(|ws| ws.directory().is_root())
                    on:click=move |_| dispatch.run(WorkspaceEvent::PasteRequested)
                >
                    <Icon icon=ic::PASTE />
                    "Paste here"
                </button>
                <button on:click=move |_| dispatch.run(WorkspaceEvent::CancelClipboard)>
                    <Icon icon=ic::CLOSE />
                    "Cancel"
                </button>
            </div>
        })}
    }
}
