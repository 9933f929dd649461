//! DOM and Web API utility functions.

use wasm_bindgen::JsCast;
use web_sys::{Event, File, HtmlInputElement, Window};

#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Hand a URL to the browser, e.g. to start a download.
pub fn navigate_to(url: &str) {
    if let Some(window) = window() {
        let _ = window.location().set_href(url);
    }
}

/// Ask the user to confirm a destructive action. Missing window means no.
pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Files chosen in the `<input type="file">` that fired `event`. The input
/// is reset so picking the same file again fires another change.
pub fn take_picked_files(event: &Event) -> Vec<File> {
    let Some(input) = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
    else {
        return Vec::new();
    };
    let files = input
        .files()
        .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
        .unwrap_or_default();
    input.set_value("");
    files
}
