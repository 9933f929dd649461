//! Process list page, with the create/edit form as an overlay.

mod form;

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeBar;
use crate::core::ProcessList;
use crate::models::{AppRoute, ControlAction, ProcessStatus, ProcessSummary, WorkspacePath};
use crate::utils::{FetchTransport, dom};

use form::ProcessForm;

stylance::import_crate_style!(css, "src/components/processes/processes.module.css");

pub(crate) type SharedList = StoredValue<ProcessList<FetchTransport>, LocalStorage>;

#[component]
pub fn ProcessesView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let revision = RwSignal::new(0u64);
    let list = ProcessList::new(ctx.client(), ctx.channel());
    list.observe(move || {
        revision.try_update(|n| *n += 1);
    });
    let list = StoredValue::new_local(list);

    // Reload whenever the push channel (re)connects so every row is subscribed.
    Effect::new(move |_| {
        ctx.connected.track();
        let list = list.get_value();
        spawn_local(async move { list.load().await });
    });

    on_cleanup(move || {
        list.try_with_value(|list| list.close());
    });

    let rows = move || {
        revision.track();
        list.with_value(|l| l.rows())
    };
    let notice = Signal::derive(move || {
        revision.track();
        list.with_value(|l| l.notice())
    });
    let on_dismiss = Callback::new(move |_: ()| list.with_value(|l| l.dismiss_notice()));

    let editing = Memo::new(move |_| match ctx.route.get() {
        AppRoute::NewProcess => Some(None),
        AppRoute::Settings { name } => Some(Some(name)),
        _ => None,
    });

    view! {
        <section class=css::page>
            <header class=css::toolbar>
                <h2>"Servers"</h2>
                <a class=css::button href=AppRoute::NewProcess.to_hash()>
                    <Icon icon=ic::PLUS />
                    "New server"
                </a>
            </header>

            <table class=css::table>
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Status"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For each=rows key=|row| row.name.clone() let:row>
                        <ProcessRow row=row list=list revision=revision />
                    </For>
                </tbody>
            </table>

            {move || editing.get().map(|existing| view! { <ProcessForm existing=existing list=list /> })}

            <NoticeBar notice=notice on_dismiss=on_dismiss />
        </section>
    }
}

#[component]
fn ProcessRow(row: ProcessSummary, list: SharedList, revision: RwSignal<u64>) -> impl IntoView {
    let name = row.name.clone();
    // The row is keyed by name; its status follows the live list.
    let status = {
        let name = name.clone();
        Memo::new(move |_| {
            revision.track();
            list.with_value(|l| {
                l.rows()
                    .into_iter()
                    .find(|r| r.name == name)
                    .map(|r| r.status)
            })
        })
    };

    let console = AppRoute::Console { name: name.clone() }.to_hash();
    let files = AppRoute::Files {
        name: name.clone(),
        path: WorkspacePath::root(),
    }
    .to_hash();
    let settings = AppRoute::Settings { name: name.clone() }.to_hash();

    let on_remove = {
        let name = name.clone();
        move |_| {
            if !dom::confirm(&format!("Remove the server {}?", name)) {
                return;
            }
            let name = name.clone();
            let list = list.get_value();
            spawn_local(async move {
                let _ = list.remove(&name).await;
            });
        }
    };

    let controls = [
        (ControlAction::Start, ic::START, "Start"),
        (ControlAction::Stop, ic::STOP, "Stop"),
        (ControlAction::Kill, ic::KILL, "Kill"),
    ]
    .into_iter()
    .map(|(action, icon, label)| {
        let disabled = move || {
            !status
                .get()
                .is_some_and(|status| action.available(&status))
        };
        let name = name.clone();
        let on_click = move |_| {
            if action
                .confirmation(&name)
                .is_some_and(|question| !dom::confirm(&question))
            {
                return;
            }
            let name = name.clone();
            let list = list.get_value();
            spawn_local(async move {
                let _ = list.control(&name, action).await;
            });
        };
        view! {
            <button class=css::iconButton title=label disabled=disabled on:click=on_click>
                <Icon icon=icon />
            </button>
        }
    })
    .collect_view();

    view! {
        <tr>
            <td>{name}</td>
            <td>
                {move || {
                    let status = status.get();
                    let class = match status {
                        Some(ProcessStatus::Online) => css::online,
                        Some(ProcessStatus::Crashed) => css::crashed,
                        _ => css::idle,
                    };
                    view! {
                        <span class=class>
                            {status.map(|s| s.to_string()).unwrap_or_default()}
                        </span>
                    }
                }}
            </td>
            <td class=css::actions>
                {controls}
                <a class=css::iconButton href=console title="Console">
                    <Icon icon=ic::TERMINAL />
                </a>
                <a class=css::iconButton href=files title="Files">
                    <Icon icon=ic::FILES />
                </a>
                <a class=css::iconButton href=settings title="Settings">
                    <Icon icon=ic::SETTINGS />
                </a>
                <button class=css::iconButton title="Remove" on:click=on_remove>
                    <Icon icon=ic::TRASH />
                </button>
            </td>
        </tr>
    }
}
