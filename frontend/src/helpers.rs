//! Small view utilities shared by the dashboard components.
//!
//! - **User Feedback**: transient toast notifications injected into the page.
//! - **Formatting**: local-time rendering of backend instants and number
//!   grouping for the KPI cards.
//! - **Form input**: reading values out of `<input>`, `<select>` and
//!   `<textarea>` events.

use chrono::{DateTime, Local, NaiveDate, Utc};
use num_format::{Locale, ToFormattedString};
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::{Event, InputEvent, TargetCast};

/// Visual weight of a toast.
#[derive(Clone, Copy, PartialEq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Displays a temporary notification at the bottom of the screen.
///
/// The element is created directly in the DOM and removes itself after a
/// few seconds, so it can be called from update handlers and async tasks
/// alike. The message is inserted as text, never as markup.
pub fn show_toast(message: &str, kind: ToastKind) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let background = match kind {
                    ToastKind::Info => "rgba(15, 23, 42, 0.9)",
                    ToastKind::Success => "rgba(22, 101, 52, 0.95)",
                    ToastKind::Error => "rgba(185, 28, 28, 0.95)",
                };
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", background).ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "6px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("max-width", "80vw").ok();

                if body.append_child(&html_toast).is_ok() {
                    let delay = if kind == ToastKind::Error { 6000 } else { 3000 };
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(delay).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

pub fn format_datetime(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|at| at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

pub fn format_date(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|at| at.with_timezone(&Local).format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// `yyyy-mm-dd`, the value format of `<input type="date">`.
pub fn input_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn format_count(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn textarea_value(e: &InputEvent) -> String {
    let input: HtmlTextAreaElement = e.target_unchecked_into();
    input.value()
}

pub fn select_value(e: &Event) -> String {
    let select: HtmlSelectElement = e.target_unchecked_into();
    select.value()
}

pub fn checkbox_value(e: &Event) -> bool {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.checked()
}
