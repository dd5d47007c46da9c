use std::future::Future;

use chrono::Duration;
use common::error::DashboardError;
use common::requests::{FollowUpLogEntry, SkuUpdate};
use common::workflow::{FOLLOW_UP_INTERVAL_DAYS, NOTE_LABEL};
use log::{debug, warn};
use yew::platform::spawn_local;
use yew::prelude::*;

use super::messages::Msg;
use super::state::StatusUpdateModal;
use crate::helpers::{show_toast, ToastKind};
use crate::tops_sheet::material_top_sheet::close_top_sheet;

pub fn update(
    component: &mut StatusUpdateModal,
    ctx: &Context<StatusUpdateModal>,
    msg: Msg,
) -> bool {
    let props = ctx.props();
    match msg {
        Msg::Load => {
            component.loading = true;
            let ticket = component.load_generation.issue();
            let client = props.client.clone();
            let id = props.record.warranty_id.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let (state, history) =
                    futures::join!(client.follow_up_state(&id), client.history(&id));
                link.send_message(Msg::Loaded {
                    ticket,
                    state,
                    history,
                });
            });
            true
        }
        Msg::Loaded {
            ticket,
            state,
            history,
        } => {
            if !component.load_generation.is_current(ticket) {
                debug!("Dropping stale follow-up state for {}", props.record.warranty_id);
                return false;
            }
            component.loading = false;
            component.load_error = None;
            match state {
                Ok(snapshot) => component.snapshot = Some(snapshot),
                Err(e) => component.load_error = Some(e.to_string()),
            }
            match history {
                Ok(entries) => component.history = entries,
                Err(e) => warn!("History for {} unavailable: {}", props.record.warranty_id, e),
            }
            true
        }

        Msg::SetStageRemark(stage, value) => {
            *component.stage_remark_mut(stage) = value;
            false
        }
        Msg::SetReviewRemark(value) => {
            component.review_remark = value;
            false
        }
        Msg::SetNote(value) => {
            component.note = value;
            false
        }
        Msg::SetFlag(field, value) => {
            component.set_flag(field, value);
            true
        }
        Msg::SetSku(value) => {
            component.sku = value;
            false
        }

        Msg::CompleteStage(stage) => {
            let known = component.known_state(&props.record);
            let remark = component.stage_remark(stage).trim().to_string();
            let client = props.client.clone();
            let id = props.record.warranty_id.clone();
            let user = props.user_email.clone();
            save(component, ctx, async move {
                let result = client.complete_stage(&id, stage, &remark, known, &user).await;
                Msg::StageSaved(stage, result)
            })
        }
        Msg::StageSaved(stage, result) => {
            component.saving = false;
            match result {
                Ok(outcome) if outcome.already_done => {
                    show_toast(
                        &format!("Follow-up {} was already completed", stage.number()),
                        ToastKind::Info,
                    );
                    ctx.link().send_message(Msg::Load);
                    true
                }
                Ok(outcome) => {
                    debug!(
                        "{} now has {} follow-ups done",
                        props.record.warranty_id, outcome.followups_done
                    );
                    saved(ctx, &format!("Follow-up {} marked as done", stage.number()))
                }
                Err(e) => failed(&e),
            }
        }
        Msg::MarkReviewDone => {
            let remark = component.review_remark.trim().to_string();
            let client = props.client.clone();
            let id = props.record.warranty_id.clone();
            let user = props.user_email.clone();
            save(component, ctx, async move {
                Msg::ReviewSaved(client.mark_review_done(&id, &remark, &user).await)
            })
        }
        Msg::ReviewSaved(result) => {
            component.saving = false;
            match result {
                Ok(()) => saved(ctx, "Review marked as done; extended warranty triggered"),
                Err(e) => failed(&e),
            }
        }
        Msg::SaveNote => {
            if component.note.trim().is_empty() {
                show_toast("Write a note first", ToastKind::Error);
                return false;
            }
            let known = component.known_state(&props.record);
            let now = props.client.clock_now();
            let entry = FollowUpLogEntry {
                warranty_id: props.record.warranty_id.clone(),
                customer_name: props.record.customer_name.clone(),
                brand: props.record.brand.map(|b| b.to_string()).unwrap_or_default(),
                follow_up_no: known.stages_done(),
                follow_up_date: Some(now),
                next_due_date: props
                    .record
                    .next_follow_up
                    .or_else(|| Some(now + Duration::days(FOLLOW_UP_INTERVAL_DAYS))),
                status: NOTE_LABEL.to_string(),
                remark: component.note.trim().to_string(),
                assigned_to: props.record.assigned_agent.clone(),
                updated_by: props.user_email.clone(),
            };
            let client = props.client.clone();
            save(component, ctx, async move {
                Msg::NoteSaved(client.log_follow_up(&entry).await)
            })
        }
        Msg::NoteSaved(result) => {
            component.saving = false;
            match result {
                Ok(()) => saved(ctx, "Note added"),
                Err(e) => failed(&e),
            }
        }
        Msg::SaveFlags => {
            let flags = component.changed_flags(&props.record, &props.user_email);
            if flags.is_empty() {
                show_toast("Nothing to save", ToastKind::Info);
                return false;
            }
            let client = props.client.clone();
            save(component, ctx, async move {
                Msg::FlagsSaved(client.update_boolean_flags(&flags).await)
            })
        }
        Msg::FlagsSaved(result) => {
            component.saving = false;
            match result {
                Ok(_) => saved(ctx, "Flags updated"),
                Err(e) => failed(&e),
            }
        }
        Msg::SaveSku => {
            let update = SkuUpdate {
                warranty_id: props.record.warranty_id.clone(),
                sku: component.sku.trim().to_string(),
                updated_by: props.user_email.clone(),
            };
            let client = props.client.clone();
            save(component, ctx, async move {
                Msg::SkuSaved(client.update_sku(&update).await)
            })
        }
        Msg::SkuSaved(result) => {
            component.saving = false;
            match result {
                Ok(()) => saved(ctx, "SKU updated"),
                Err(e) => failed(&e),
            }
        }

        Msg::SendEmail => {
            component.load_generation.invalidate();
            close_top_sheet(component.sheet_ref.clone());
            props.on_email.emit(props.record.clone());
            false
        }
        Msg::Close => {
            component.load_generation.invalidate();
            close_top_sheet(component.sheet_ref.clone());
            props.on_close.emit(());
            false
        }
    }
}

/// Runs one write unless another is still in flight.
fn save(
    component: &mut StatusUpdateModal,
    ctx: &Context<StatusUpdateModal>,
    task: impl Future<Output = Msg> + 'static,
) -> bool {
    if component.saving {
        return false;
    }
    component.saving = true;
    let link = ctx.link().clone();
    spawn_local(async move {
        link.send_message(task.await);
    });
    true
}

fn saved(ctx: &Context<StatusUpdateModal>, message: &str) -> bool {
    show_toast(message, ToastKind::Success);
    ctx.props().on_saved.emit(());
    ctx.link().send_message(Msg::Close);
    true
}

/// Keeps the form as typed so the operator can retry.
fn failed(error: &DashboardError) -> bool {
    show_toast(&error.to_string(), ToastKind::Error);
    true
}
