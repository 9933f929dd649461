//! Dismissible outcome message.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::components::icons as ic;
use crate::models::{Notice, NoticeKind};

stylance::import_crate_style!(css, "src/components/layout.module.css");

#[component]
pub fn NoticeBar(
    #[prop(into)] notice: Signal<Option<Notice>>,
    on_dismiss: Callback<()>,
) -> impl IntoView {
    move || {
        notice.get().map(|notice| {
            let class = match notice.kind {
                NoticeKind::Error => css::noticeError,
                NoticeKind::Success => css::noticeSuccess,
            };
            view! {
                <div class=class role="status">
                    <span>{notice.text}</span>
                    <button class=css::iconButton on:click=move |_| on_dismiss.run(())>
                        <Icon icon=ic::CLOSE />
                    </button>
                </div>
            }
        })
    }
}
