//! Page header: navigation and push-connection indicator.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::APP_NAME;
use crate::models::{AppRoute, WorkspacePath};

stylance::import_crate_style!(css, "src/components/layout.module.css");

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let process = Memo::new(move |_| ctx.route.get().process().map(str::to_string));

    view! {
        <header class=css::header>
            <a class=css::brand href=AppRoute::Processes.to_hash()>
                <Icon icon=ic::SERVER />
                <span>{APP_NAME}</span>
            </a>

            {move || process.get().map(|name| view! { <ProcessNav name=name /> })}

            <ConnectionIndicator />
        </header>
    }
}

/// Links between the views of one process.
#[component]
fn ProcessNav(name: String) -> impl IntoView {
    let console = AppRoute::Console { name: name.clone() }.to_hash();
    let files = AppRoute::Files {
        name: name.clone(),
        path: WorkspacePath::root(),
    }
    .to_hash();

    view! {
        <nav class=css::nav>
            <span class=css::processName>{name}</span>
            <a class=css::navLink href=console>
                <Icon icon=ic::TERMINAL />
                "Console"
            </a>
            <a class=css::navLink href=files>
                <Icon icon=ic::FILES />
                "Files"
            </a>
        </nav>
    }
}

#[component]
fn ConnectionIndicator() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let connected = ctx.connected;

    view! {
        <div class=css::connection>
            <Show
                when=move || connected.get()
                fallback=move || view! {
                    <span class=css::offline title="Live updates are paused">
                        <Icon icon=ic::OFFLINE />
                    </span>
                    <button class=css::reconnect on:click=move |_| ctx.connect()>
                        "Reconnect"
                    </button>
                }
            >
                <span class=css::online title="Live updates">
                    <Icon icon=ic::ONLINE />
                </span>
            </Show>
        </div>
    }
}
