//! Application router component.
//!
//! The URL hash is the source of truth. Views are chosen by page kind, not
//! by the full route, so switching between two processes on the same page
//! keeps the view mounted and lets it rebind its subscriptions in place.

use leptos::prelude::*;
use wasm_bindgen::prelude::Closure;

use crate::app::AppContext;
use crate::components::console::ConsoleView;
use crate::components::editor::EditorView;
use crate::components::files::FilesView;
use crate::components::layout::Header;
use crate::components::processes::ProcessesView;
use crate::models::AppRoute;

stylance::import_crate_style!(css, "src/components/layout.module.css");

/// Which view a route renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Page {
    Processes,
    Console,
    Files,
    Edit,
}

impl Page {
    fn of(route: &AppRoute) -> Self {
        match route {
            AppRoute::Processes | AppRoute::NewProcess | AppRoute::Settings { .. } => {
                Self::Processes
            }
            AppRoute::Console { .. } => Self::Console,
            AppRoute::Files { .. } => Self::Files,
            AppRoute::Edit { .. } => Self::Edit,
        }
    }
}

#[component]
pub fn AppRouter() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route = ctx.route;

    {
        use wasm_bindgen::JsCast;
        let closure = Closure::wrap(Box::new(move || {
            route.set(AppRoute::current());
        }) as Box<dyn Fn()>);

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        }

        // Lives as long as the page.
        closure.forget();
    }

    let page = Memo::new(move |_| Page::of(&route.get()));
    // The file manager keeps one workspace per process.
    let files_process = Memo::new(move |_| match route.get() {
        AppRoute::Files { name, .. } => Some(name),
        _ => None,
    });

    view! {
        <div class=css::app>
            <Header />
            <main class=css::main>
                {move || match page.get() {
                    Page::Processes => view! { <ProcessesView /> }.into_any(),
                    Page::Console => view! { <ConsoleView /> }.into_any(),
                    Page::Files => match files_process.get() {
                        Some(process) => view! { <FilesView process=process /> }.into_any(),
                        None => ().into_any(),
                    },
                    Page::Edit => view! { <EditorView /> }.into_any(),
                }}
            </main>
        </div>
    }
}
