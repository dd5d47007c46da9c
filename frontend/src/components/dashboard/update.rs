//! Update function for the dashboard.
//!
//! Every change to the loaded list, the scope or the table query ends in
//! `DashboardComponent::recompute`; responses of superseded list and KPI
//! requests and of summary batches from an earlier round are dropped by
//! their `Generation` ticket.

use common::kpi::{select_kpi, BackendKpis};
use common::model::warranty::Brand;
use common::requests::{BooleanFlags, ListFilter};
use log::{debug, warn};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::helpers::{show_toast, ToastKind};

use super::messages::Msg;
use super::state::DashboardComponent;

pub fn update(
    component: &mut DashboardComponent,
    ctx: &Context<DashboardComponent>,
    msg: Msg,
) -> bool {
    match msg {
        Msg::Refresh => {
            refresh(component, ctx);
            true
        }
        Msg::ListLoaded { ticket, result } => {
            if !component.list_generation.is_current(ticket) {
                debug!("Dropping stale list response {}", ticket);
                return false;
            }
            component.loading = false;
            match result {
                Ok(records) => {
                    component.records = records;
                    component.load_error = None;
                    component.reset_summaries();
                    component.recompute();
                    request_summaries(component, ctx);
                }
                Err(e) => {
                    component.load_error = Some(e.to_string());
                    show_toast(&format!("Error loading warranties: {}", e), ToastKind::Error);
                }
            }
            true
        }
        Msg::KpisLoaded {
            ticket,
            todays,
            first,
        } => {
            if !component.kpi_generation.is_current(ticket) {
                return false;
            }
            component.backend_kpis = BackendKpis {
                todays_due: todays.map_err(|e| warn!("todaysFollowupsKpi: {}", e)).ok(),
                first_followups: first.map_err(|e| warn!("firstFollowupKpi: {}", e)).ok(),
            };
            component.recompute();
            true
        }
        Msg::SummariesLoaded { ticket, ids, result } => {
            if !component.apply_summaries(ticket, ids, result) {
                debug!("Dropping stale summary batch {}", ticket);
                return false;
            }
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::SetRange(range) => {
            component.range = range;
            component.query.clear_ad_hoc();
            component.pager.reset();
            refresh(component, ctx);
            true
        }
        Msg::SetBrand(key) => {
            component.brand = Brand::parse(&key);
            component.query.clear_ad_hoc();
            component.pager.reset();
            refresh(component, ctx);
            true
        }
        Msg::SetSearchInput(value) => {
            component.search_input = value;
            false
        }
        Msg::SubmitSearch => {
            component.query.search = component.search_input.trim().to_string();
            component.query.clear_ad_hoc();
            component.pager.reset();
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::SelectKpi(kind) => {
            if !select_kpi(&mut component.query, kind) {
                return false;
            }
            component.search_input.clear();
            component.pager.reset();
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::ClearAdHoc => {
            component.query.clear_ad_hoc();
            component.pager.reset();
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::SetFilters(filters) => {
            component.query.filters = filters;
            component.pager.reset();
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::ToggleSort(field) => {
            component.query.sort.toggle(field);
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::GoToPage(page) => {
            component.pager.go_to(page);
            component.recompute();
            request_summaries(component, ctx);
            true
        }
        Msg::OpenRecord(record) => {
            component.selected = Some(record);
            true
        }
        Msg::CloseRecord => {
            component.selected = None;
            true
        }
        Msg::RecordSaved => {
            component.refresh_version += 1;
            component.summaries.clear();
            component.reset_summaries();
            debug!("Reloading after save (version {})", component.refresh_version);
            refresh(component, ctx);
            true
        }
        Msg::OpenEmail(record) => {
            component.selected = None;
            component.emailing = Some(record);
            true
        }
        Msg::CloseEmail => {
            component.emailing = None;
            true
        }
        Msg::EmailSent(warranty_id) => {
            component.emailing = None;
            let flags = BooleanFlags {
                warranty_id,
                warranty_card_sent: Some(true),
                updated_by: ctx.props().user_email.clone(),
                ..Default::default()
            };
            let client = ctx.props().client.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = client.update_boolean_flags(&flags).await;
                link.send_message(Msg::CardFlagSaved(result));
            });
            true
        }
        Msg::CardFlagSaved(Ok(_)) => {
            ctx.link().send_message(Msg::RecordSaved);
            false
        }
        Msg::CardFlagSaved(Err(e)) => {
            show_toast(
                &format!("Email sent, but the card flag was not saved: {}", e),
                ToastKind::Error,
            );
            false
        }
        Msg::Logout => {
            ctx.props().on_logout.emit(());
            false
        }
    }
}

/// Reloads the list for the current scope and the backend KPI aggregates.
fn refresh(component: &mut DashboardComponent, ctx: &Context<DashboardComponent>) {
    component.loading = true;
    let client = ctx.props().client.clone();
    let filter = ListFilter {
        brand: component.brand,
        start: Some(component.range.from),
        end: Some(component.range.to),
    };

    let ticket = component.list_generation.issue();
    let link = ctx.link().clone();
    let list_client = client.clone();
    spawn_local(async move {
        let result = list_client.list_warranties(&filter).await;
        link.send_message(Msg::ListLoaded { ticket, result });
    });

    let ticket = component.kpi_generation.issue();
    let link = ctx.link().clone();
    spawn_local(async move {
        let (todays, first) =
            futures::join!(client.todays_followups_kpi(), client.first_followup_kpi());
        link.send_message(Msg::KpisLoaded {
            ticket,
            todays,
            first,
        });
    });
}

/// Fetches summaries for visible rows in one batch; the client cache
/// collapses repeats and concurrent requests.
fn request_summaries(component: &mut DashboardComponent, ctx: &Context<DashboardComponent>) {
    let ids = component.missing_summaries();
    if ids.is_empty() {
        return;
    }
    let ticket = component.begin_summaries(&ids);
    let client = ctx.props().client.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = client.summaries(&ids).await;
        link.send_message(Msg::SummariesLoaded {
            ticket,
            ids,
            result,
        });
    });
}
