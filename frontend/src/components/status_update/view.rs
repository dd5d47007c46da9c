use common::workflow::{Stage, WorkflowState};
use yew::html::Scope;
use yew::prelude::*;

use super::messages::{FlagField, Msg};
use super::state::StatusUpdateModal;
use crate::helpers::{checkbox_value, format_date, format_datetime, input_value, textarea_value};
use crate::tops_sheet::material_top_sheet::MaterialTopSheet;

pub fn view(component: &StatusUpdateModal, ctx: &Context<StatusUpdateModal>) -> Html {
    let link = ctx.link();
    let record = &ctx.props().record;
    let known = component.known_state(record);

    html! {
        <MaterialTopSheet node_ref={component.sheet_ref.clone()}>
            <div class="sheet-header">
                <div>
                    <h3>{ format!("{} ({})", record.customer_name, record.warranty_id) }</h3>
                    <small>
                        { format!("{} · {} · {}",
                            record.brand.map(|b| b.as_str()).unwrap_or("-"),
                            record.product,
                            known.status().label()) }
                    </small>
                </div>
                <button onclick={link.callback(|_| Msg::Close)}>{ "Close" }</button>
            </div>

            if component.loading {
                <p>{ "Loading follow-up state..." }</p>
            }
            if let Some(error) = &component.load_error {
                <p class="error-list">{ format!("Could not load follow-up state: {}", error) }</p>
            }

            <p>{ format!("Next follow-up due: {}", format_date(record.next_follow_up)) }</p>

            { for Stage::ALL.into_iter().map(|stage| build_stage(component, link, known, stage)) }
            { build_review(component, link, known) }
            { build_note(component, link) }
            { build_flags(component, link) }
            { build_sku(component, link) }
            { build_history(component) }

            <div class="stage-row">
                <button onclick={link.callback(|_| Msg::SendEmail)}>{ "Send warranty card email" }</button>
            </div>
        </MaterialTopSheet>
    }
}

fn build_stage(
    component: &StatusUpdateModal,
    link: &Scope<StatusUpdateModal>,
    known: WorkflowState,
    stage: Stage,
) -> Html {
    let n = stage.number();
    let snapshot = component.snapshot.as_ref().and_then(|s| s.stage(n));

    if let Some(done) = snapshot.filter(|s| s.done) {
        return html! {
            <div class="stage-row">
                <strong>{ format!("Follow-up {}", n) }</strong>
                <span class="badge yes">{ format!("Done {}", format_datetime(done.date)) }</span>
                <span>{ done.remark.clone() }</span>
            </div>
        };
    }
    if known.stages_done() >= n && !known.is_terminal() {
        return html! {
            <div class="stage-row">
                <strong>{ format!("Follow-up {}", n) }</strong>
                <span class="badge yes">{ "Done" }</span>
            </div>
        };
    }

    let available = known.next_stage() == Some(stage);
    let title = match (known.is_terminal(), available) {
        (true, _) => "Review already completed".to_string(),
        (false, false) => format!("Complete follow-up {} first", n.saturating_sub(1)),
        (false, true) => String::new(),
    };
    html! {
        <div class="stage-row">
            <strong>{ format!("Follow-up {}", n) }</strong>
            <textarea
                placeholder="Remark"
                disabled={!available}
                value={component.stage_remark(stage).to_string()}
                oninput={link.callback(move |e: InputEvent| Msg::SetStageRemark(stage, textarea_value(&e)))}
            />
            <button
                disabled={!available || component.saving}
                title={title}
                onclick={link.callback(move |_| Msg::CompleteStage(stage))}
            >
                { format!("Mark follow-up {} done", n) }
            </button>
        </div>
    }
}

fn build_review(
    component: &StatusUpdateModal,
    link: &Scope<StatusUpdateModal>,
    known: WorkflowState,
) -> Html {
    if known.is_terminal() {
        return html! {
            <div class="stage-row">
                <strong>{ "Review" }</strong>
                <span class="badge yes">{ "Review received" }</span>
            </div>
        };
    }
    html! {
        <div class="stage-row">
            <strong>{ "Review" }</strong>
            <textarea
                placeholder="Remark"
                value={component.review_remark.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetReviewRemark(textarea_value(&e)))}
            />
            <button
                disabled={component.saving}
                onclick={link.callback(|_| Msg::MarkReviewDone)}
            >
                { "Mark review done" }
            </button>
        </div>
    }
}

fn build_note(component: &StatusUpdateModal, link: &Scope<StatusUpdateModal>) -> Html {
    html! {
        <div class="stage-row">
            <strong>{ "Note" }</strong>
            <textarea
                placeholder="Add a note to the history"
                value={component.note.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetNote(textarea_value(&e)))}
            />
            <button disabled={component.saving} onclick={link.callback(|_| Msg::SaveNote)}>
                { "Add note" }
            </button>
        </div>
    }
}

fn build_flags(component: &StatusUpdateModal, link: &Scope<StatusUpdateModal>) -> Html {
    let flag = |field: FlagField, label: &'static str| {
        html! {
            <label>
                <input
                    type="checkbox"
                    checked={component.flag(field)}
                    onchange={link.callback(move |e: Event| Msg::SetFlag(field, checkbox_value(&e)))}
                />
                { label }
            </label>
        }
    };
    html! {
        <div class="stage-row">
            { flag(FlagField::WarrantyCardSent, "Warranty card sent") }
            { flag(FlagField::FeedbackReceived, "Feedback received") }
            { flag(FlagField::ExtendedWarrantySent, "Extended warranty sent") }
            <button disabled={component.saving} onclick={link.callback(|_| Msg::SaveFlags)}>
                { "Save flags" }
            </button>
        </div>
    }
}

fn build_sku(component: &StatusUpdateModal, link: &Scope<StatusUpdateModal>) -> Html {
    html! {
        <div class="stage-row">
            <strong>{ "SKU" }</strong>
            <input
                type="text"
                value={component.sku.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetSku(input_value(&e)))}
            />
            <button disabled={component.saving} onclick={link.callback(|_| Msg::SaveSku)}>
                { "Save SKU" }
            </button>
        </div>
    }
}

fn build_history(component: &StatusUpdateModal) -> Html {
    if component.history.is_empty() {
        return html! { <p class="empty-state">{ "No follow-up history yet." }</p> };
    }
    html! {
        <ul class="history-list">
            { for component.history.iter().rev().map(|entry| html! {
                <li>
                    <strong>{ entry.status.clone() }</strong>
                    { format!(" · {} · {}", format_datetime(entry.timestamp.or(entry.follow_up_date)), entry.updated_by) }
                    if !entry.remark.is_empty() {
                        <div>{ entry.remark.clone() }</div>
                    }
                </li>
            }) }
        </ul>
    }
}
