//! Table markup: toolbar, optional filter row, header, rows and pager.

use common::columns::ColumnDef;
use common::model::warranty::{Brand, FollowUpStatus, WarrantyRecord};
use common::table::{DoneFilter, FlagFilter};
use yew::html::Scope;
use yew::prelude::*;

use super::column_chooser::column_chooser;
use super::messages::{FilterKey, Msg};
use super::state::CustomerTable;
use crate::helpers::{format_count, format_datetime, select_value};

pub fn view(component: &CustomerTable, ctx: &Context<CustomerTable>) -> Html {
    let props = ctx.props();
    let link = ctx.link();
    let columns = component.prefs.visible_columns();

    html! {
        <div class="table-card">
            <div class="table-toolbar">
                <span>{ format!("{} warranties", format_count(props.total as u64)) }</span>
                <button onclick={link.callback(|_| Msg::ToggleFilterRow)}>
                    { if component.show_filters { "Hide filters" } else { "Filters" } }
                </button>
                if props.query.filters.any_active() {
                    <button onclick={link.callback(|_| Msg::ClearFilters)}>{ "Clear filters" }</button>
                }
                <button onclick={link.callback(|_| Msg::OpenChooser)}>{ "Columns" }</button>
            </div>

            if component.show_filters {
                { build_filters(ctx) }
            }

            <table class="customers">
                <thead>
                    <tr>
                        { for columns.iter().map(|def| build_header(def, ctx)) }
                    </tr>
                </thead>
                <tbody>
                    if props.rows.is_empty() {
                        <tr>
                            <td class="empty-state" colspan={columns.len().max(1).to_string()}>
                                { "No warranties match the current filters." }
                            </td>
                        </tr>
                    } else {
                        { for props.rows.iter().map(|record| {
                            let onclick = {
                                let on_open = props.on_open.clone();
                                let record = record.clone();
                                Callback::from(move |_| on_open.emit(record.clone()))
                            };
                            html! {
                                <tr {onclick}>
                                    { for columns.iter().map(|def| html! {
                                        <td>{ cell(def.id, record, ctx) }</td>
                                    }) }
                                </tr>
                            }
                        }) }
                    }
                </tbody>
            </table>

            { build_pager(ctx) }
            { column_chooser(component, link) }
        </div>
    }
}

fn build_header(def: &ColumnDef, ctx: &Context<CustomerTable>) -> Html {
    let props = ctx.props();
    match def.sort {
        Some(field) => {
            let arrow = if props.query.sort.field == field {
                props.query.sort.direction.arrow()
            } else {
                ""
            };
            let on_sort = props.on_sort.clone();
            html! {
                <th class="sortable" onclick={Callback::from(move |_| on_sort.emit(field))}>
                    { def.label }{ " " }{ arrow }
                </th>
            }
        }
        None => html! { <th>{ def.label }</th> },
    }
}

fn yes_no(value: bool) -> Html {
    if value {
        html! { <span class="badge yes">{ "Yes" }</span> }
    } else {
        html! { <span class="badge no">{ "No" }</span> }
    }
}

fn cell(id: &str, record: &WarrantyRecord, ctx: &Context<CustomerTable>) -> Html {
    let props = ctx.props();
    let text = match id {
        "warrantyId" => record.warranty_id.clone(),
        "timestamp" => format_datetime(record.timestamp),
        "brand" => record.brand.map(|b| b.as_str()).unwrap_or("-").to_string(),
        "customer" => record.customer_name.clone(),
        "contact" => {
            return html! {
                <>
                    <div>{ record.phone.clone() }</div>
                    <div>{ record.email.clone() }</div>
                </>
            }
        }
        "product" => record.product.clone(),
        "purchasedFrom" => record.purchased_from.clone(),
        "warrantyCardSent" => return yes_no(record.warranty_card_sent),
        "feedbackReceived" => return yes_no(record.feedback_received),
        "extendedSent" => return yes_no(record.extended_warranty_sent),
        "nry24" if record.nry24.is_empty() => "-".to_string(),
        "nry24" => record.nry24.clone(),
        "followUpStatus" => record.follow_up_status.label().to_string(),
        "followUpsDone" if record.feedback_received => "Completed".to_string(),
        "followUpsDone"
            if record.followups_done.is_none()
                && props.summary_loading.contains(&record.warranty_id) =>
        {
            "...".to_string()
        }
        "followUpsDone" => {
            let summary = props.summaries.get(&record.warranty_id);
            format!("{}/3", record.followups_count(summary))
        }
        _ => String::new(),
    };
    html! { { text } }
}

fn filter_select(
    link: &Scope<CustomerTable>,
    key: FilterKey,
    label: &'static str,
    current: String,
    options: Vec<(String, String)>,
) -> Html {
    html! {
        <label>
            { label }
            <select onchange={link.callback(move |e: Event| Msg::SetFilter(key, select_value(&e)))}>
                { for options.into_iter().map(|(value, text)| html! {
                    <option selected={value == current} value={value.clone()}>{ text }</option>
                }) }
            </select>
        </label>
    }
}

fn flag_options() -> Vec<(String, String)> {
    FlagFilter::ALL
        .into_iter()
        .map(|flag| (flag.key().to_string(), flag.key().to_string()))
        .collect()
}

fn build_filters(ctx: &Context<CustomerTable>) -> Html {
    let link = ctx.link();
    let filters = &ctx.props().query.filters;

    let brands = std::iter::once((String::new(), "All".to_string()))
        .chain(Brand::ALL.into_iter().map(|b| (b.as_str().to_string(), b.as_str().to_string())))
        .collect();
    let statuses = std::iter::once((String::new(), "All".to_string()))
        .chain(
            FollowUpStatus::ALL
                .into_iter()
                .map(|s| (s.label().to_string(), s.label().to_string())),
        )
        .collect();
    let done = DoneFilter::ALL
        .into_iter()
        .map(|filter| (filter.key(), filter.key()))
        .collect();

    html! {
        <div class="filter-grid">
            { filter_select(link, FilterKey::Brand, "Brand",
                filters.brand.map(|b| b.as_str().to_string()).unwrap_or_default(), brands) }
            { filter_select(link, FilterKey::WarrantyCardSent, "Warranty Card Sent",
                filters.warranty_card_sent.key().to_string(), flag_options()) }
            { filter_select(link, FilterKey::FeedbackReceived, "Feedback Received",
                filters.feedback_received.key().to_string(), flag_options()) }
            { filter_select(link, FilterKey::ExtendedWarrantySent, "Extended Warranty Sent",
                filters.extended_warranty_sent.key().to_string(), flag_options()) }
            { filter_select(link, FilterKey::FollowUpStatus, "Follow-Up Status",
                filters.follow_up_status.map(|s| s.label().to_string()).unwrap_or_default(), statuses) }
            { filter_select(link, FilterKey::FollowUpsDone, "Follow-ups Done",
                filters.followups_done.key(), done) }
            { filter_select(link, FilterKey::DueToday, "Due Today",
                filters.due_today.key().to_string(), flag_options()) }
        </div>
    }
}

/// Numbered buttons around the current page plus previous/next.
fn build_pager(ctx: &Context<CustomerTable>) -> Html {
    let props = ctx.props();
    if props.total_pages <= 1 {
        return html! {};
    }
    let page = props.page;
    let first = page.saturating_sub(2).max(1);
    let last = (page + 2).min(props.total_pages);
    let go = |target: usize| {
        let on_page = props.on_page.clone();
        Callback::from(move |_: MouseEvent| on_page.emit(target))
    };

    html! {
        <div class="pager">
            <button disabled={page <= 1} onclick={go(page.saturating_sub(1).max(1))}>{ "Prev" }</button>
            { for (first..=last).map(|n| html! {
                <button class={classes!((n == page).then_some("current"))} onclick={go(n)}>
                    { n }
                </button>
            }) }
            <button disabled={page >= props.total_pages} onclick={go(page + 1)}>{ "Next" }</button>
            <span>{ format!("Page {} of {}", page, props.total_pages) }</span>
        </div>
    }
}
