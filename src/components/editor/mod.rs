//! In-app text editor for files below the inline size limit.

use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::components::notice::NoticeBar;
use crate::core::remote::Operation;
use crate::models::{AppRoute, Notice};
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/editor/editor.module.css");

#[component]
pub fn EditorView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let target = Memo::new(move |_| match ctx.route.get() {
        AppRoute::Edit { name, path } => Some((name, path)),
        _ => None,
    });

    let content = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<Notice>);
    let saving = RwSignal::new(false);
    // Loads that finish after the route moved on are dropped.
    let generation = StoredValue::new(0u64);

    Effect::new(move |_| {
        let Some((process, path)) = target.get() else {
            return;
        };
        generation.update_value(|g| *g += 1);
        let current = generation.get_value();
        content.set(None);
        notice.set(None);

        let client = ctx.client();
        spawn_local(async move {
            let result = client.fetch_content(&process, &path).await;
            if generation.try_get_value() != Some(current) {
                return;
            }
            match result {
                Ok(text) => {
                    content.try_set(Some(text));
                }
                Err(err) => {
                    notice.try_set(Some(Notice::failure(Operation::FetchContent, &err, &process)));
                }
            }
        });
    });

    let on_save = move |_| {
        let (Some((process, path)), Some(text)) = (target.get_untracked(), content.get_untracked())
        else {
            return;
        };
        saving.set(true);
        let client = ctx.client();
        spawn_local(async move {
            let result = client.save_content(&process, &path, &text).await;
            saving.try_set(false);
            let outcome = match result {
                Ok(()) => Notice::success_for(Operation::SaveContent),
                Err(err) => Some(Notice::failure(Operation::SaveContent, &err, &process)),
            };
            notice.try_set(outcome);
        });
    };

    let on_download = move |_| {
        if let Some((process, path)) = target.get_untracked() {
            dom::navigate_to(&ctx.client().download_url(&process, &path));
        }
    };

    let on_close = move |_| ctx.route.get_untracked().parent().push();

    let loaded = Memo::new(move |_| content.with(Option::is_some));

    let title = move || {
        target
            .get()
            .map(|(_, path)| path.to_string())
            .unwrap_or_default()
    };

    view! {
        <section class=css::editor>
            <header class=css::toolbar>
                <span class=css::title>
                    <Icon icon=ic::FILE />
                    {title}
                </span>
                <button
                    disabled=move || saving.get() || !loaded.get()
                    on:click=on_save
                >
                    <Icon icon=ic::SAVE />
                    "Save"
                </button>
                <button on:click=on_download>
                    <Icon icon=ic::DOWNLOAD />
                    "Download"
                </button>
                <button class=css::iconButton on:click=on_close>
                    <Icon icon=ic::CLOSE />
                </button>
            </header>

            <Show
                when=move || loaded.get()
                fallback=|| view! { <p class=css::loading>"Loading…"</p> }
            >
                <textarea
                    class=css::text
                    spellcheck="false"
                    prop:value=move || content.get().unwrap_or_default()
                    on:input=move |ev| content.set(Some(event_target_value(&ev)))
                />
            </Show>

            <NoticeBar notice=notice on_dismiss=Callback::new(move |_: ()| notice.set(None)) />
        </section>
    }
}
