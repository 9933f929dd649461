//! Console view: live status, lifecycle controls and console output of one
//! process.
//!
//! The view stays mounted while the route switches between processes; the
//! [`ConsoleSession`] releases the old process's subscriptions before the
//! new process's are made.

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeBar;
use crate::core::ConsoleSession;
use crate::models::{ControlAction, ProcessStatus};
use crate::utils::{FetchTransport, dom};

stylance::import_crate_style!(css, "src/components/console/console.module.css");

#[component]
pub fn ConsoleView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let process = Memo::new(move |_| ctx.route.get().process().map(str::to_string));

    // Bumped by the session on every state change.
    let revision = RwSignal::new(0u64);
    let session = ConsoleSession::new(ctx.client(), ctx.channel(), ctx.config.console_capacity);
    session.observe(move || {
        revision.try_update(|n| *n += 1);
    });
    let session = StoredValue::new_local(session);

    // (Re)open on process change, and once more when the push channel comes
    // back so the subscriptions are made.
    Effect::new(move |prev: Option<(Option<String>, bool)>| {
        let current = (process.get(), ctx.connected.get());
        let reopen = match &prev {
            None => true,
            Some((prev_process, was_connected)) => {
                *prev_process != current.0 || (!was_connected && current.1)
            }
        };
        if reopen && let Some(name) = current.0.clone() {
            let session = session.get_value();
            spawn_local(async move { session.open(&name).await });
        }
        current
    });

    on_cleanup(move || {
        session.try_with_value(|session| session.close());
    });

    let status = Signal::derive(move || {
        revision.track();
        session.with_value(|s| s.status())
    });
    let notice = Signal::derive(move || {
        revision.track();
        session.with_value(|s| s.notice())
    });
    let on_dismiss = Callback::new(move |_: ()| session.with_value(|s| s.dismiss_notice()));

    view! {
        <section class=css::console>
            <header class=css::toolbar>
                <StatusBadge status=status />
                <ControlButtons status=status session=session />
            </header>

            <ConsoleOutput revision=revision session=session />
            <CommandInput session=session />

            <NoticeBar notice=notice on_dismiss=on_dismiss />
        </section>
    }
}

#[component]
fn StatusBadge(status: Signal<Option<ProcessStatus>>) -> impl IntoView {
    view! {
        <span class=css::status>
            {move || match status.get() {
                Some(status) => status.to_string(),
                None => "…".to_string(),
            }}
        </span>
    }
}

#[component]
fn ControlButtons(
    status: Signal<Option<ProcessStatus>>,
    session: StoredValue<ConsoleSession<FetchTransport>, LocalStorage>,
) -> impl IntoView {
    let actions = [
        (ControlAction::Start, ic::START, "Start"),
        (ControlAction::Stop, ic::STOP, "Stop"),
        (ControlAction::Restart, ic::RESTART, "Restart"),
        (ControlAction::Kill, ic::KILL, "Kill"),
    ];

    actions
        .into_iter()
        .map(|(action, icon, label)| {
            let disabled = move || {
                !status
                    .get()
                    .is_some_and(|status| action.available(&status))
            };
            let on_click = move |_| {
                let session = session.get_value();
                let question = session
                    .process()
                    .and_then(|name| action.confirmation(&name));
                if question.is_some_and(|question| !dom::confirm(&question)) {
                    return;
                }
                spawn_local(async move {
                    let _ = session.control(action).await;
                });
            };
            view! {
                <button class=css::control disabled=disabled on:click=on_click>
                    <Icon icon=icon />
                    {label}
                </button>
            }
        })
        .collect_view()
}

#[component]
fn ConsoleOutput(
    revision: RwSignal<u64>,
    session: StoredValue<ConsoleSession<FetchTransport>, LocalStorage>,
) -> impl IntoView {
    let lines = move || {
        revision.track();
        session.with_value(|s| s.lines())
    };

    view! {
        <pre class=css::output>
            <For each=lines key=|line| line.id let:line>
                <div class=css::line>{line.text}</div>
            </For>
        </pre>
    }
}

#[component]
fn CommandInput(
    session: StoredValue<ConsoleSession<FetchTransport>, LocalStorage>,
) -> impl IntoView {
    let command = RwSignal::new(String::new());

    let submit = move || {
        let text = command.get_untracked();
        let session = session.get_value();
        spawn_local(async move {
            if session.send_command(&text).await.is_ok() {
                command.try_set(String::new());
            }
        });
    };

    view! {
        <div class=css::command>
            <span class=css::prompt>">"</span>
            <input
                type="text"
                placeholder="Send a command"
                prop:value=move || command.get()
                on:input=move |ev| command.set(event_target_value(&ev))
                on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        submit();
                    }
                }
            />
            <button class=css::control on:click=move |_| submit()>
                "Send"
            </button>
        </div>
    }
}
