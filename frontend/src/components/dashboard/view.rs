//! View rendering for the dashboard: header, scope controls, KPI row, the
//! customer table and whichever modal is open.

use common::kpi::active_kpi;
use common::model::warranty::Brand;
use web_sys::KeyboardEvent;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::DashboardComponent;
use crate::components::customer_table::CustomerTable;
use crate::components::date_range_picker::DateRangePicker;
use crate::components::email_modal::EmailModal;
use crate::components::kpi_cards::KpiCards;
use crate::components::status_update::StatusUpdateModal;
use crate::helpers::{input_value, select_value};

pub fn view(component: &DashboardComponent, ctx: &Context<DashboardComponent>) -> Html {
    let link = ctx.link();
    let props = ctx.props();

    html! {
        <div class="dashboard">
            <div class="dashboard-header">
                <h1>{ "Warranty Management" }</h1>
                <div>
                    <span>{ &props.user_email }</span>
                    <button onclick={link.callback(|_| Msg::Logout)}>{ "Logout" }</button>
                </div>
            </div>

            { build_controls(component, link) }

            <KpiCards
                snapshot={component.kpis.clone()}
                active={active_kpi(&component.query)}
                on_select={link.callback(Msg::SelectKpi)}
            />

            { build_ad_hoc_chip(component, link) }
            { build_table(component, link) }
            { build_modals(component, ctx) }
        </div>
    }
}

fn build_controls(component: &DashboardComponent, link: &Scope<DashboardComponent>) -> Html {
    let selected_brand = component.brand.map(|b| b.as_str()).unwrap_or("");
    let onkeydown = link.batch_callback(|e: KeyboardEvent| {
        (e.key() == "Enter").then_some(Msg::SubmitSearch)
    });

    html! {
        <div class="dashboard-controls">
            <select onchange={link.callback(|e: Event| Msg::SetBrand(select_value(&e)))}>
                <option value="" selected={selected_brand.is_empty()}>{ "All brands" }</option>
                { for Brand::ALL.into_iter().map(|brand| html! {
                    <option value={brand.as_str()} selected={selected_brand == brand.as_str()}>
                        { brand.as_str() }
                    </option>
                }) }
            </select>

            <DateRangePicker
                value={component.range}
                on_change={link.callback(Msg::SetRange)}
            />

            <input
                type="search"
                placeholder="Search by warranty ID"
                value={component.search_input.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetSearchInput(input_value(&e)))}
                {onkeydown}
            />
            <button onclick={link.callback(|_| Msg::SubmitSearch)}>{ "Search" }</button>
            <button
                onclick={link.callback(|_| Msg::Refresh)}
                disabled={component.loading}
            >
                { "Refresh" }
            </button>
        </div>
    }
}

fn build_ad_hoc_chip(component: &DashboardComponent, link: &Scope<DashboardComponent>) -> Html {
    match component.query.ad_hoc {
        Some(filter) => html! {
            <div class="table-toolbar">
                <span class="badge yes">{ format!("Showing: {}", filter.label()) }</span>
                <button onclick={link.callback(|_| Msg::ClearAdHoc)}>{ "Clear" }</button>
            </div>
        },
        None => html! {},
    }
}

fn build_table(component: &DashboardComponent, link: &Scope<DashboardComponent>) -> Html {
    if component.loading && component.records.is_empty() {
        return html! { <div class="empty-state">{ "Loading warranties..." }</div> };
    }
    if let (Some(error), true) = (&component.load_error, component.records.is_empty()) {
        return html! {
            <div class="empty-state">
                <p>{ format!("Could not load warranties: {}", error) }</p>
                <button onclick={link.callback(|_| Msg::Refresh)}>{ "Retry" }</button>
            </div>
        };
    }

    html! {
        <CustomerTable
            rows={component.page_rows.clone()}
            total={component.total}
            page={component.pager.page()}
            total_pages={component.total_pages}
            query={component.query.clone()}
            summaries={component.summaries.clone()}
            summary_loading={component.summary_loading.clone()}
            on_filters={link.callback(Msg::SetFilters)}
            on_sort={link.callback(Msg::ToggleSort)}
            on_page={link.callback(Msg::GoToPage)}
            on_open={link.callback(Msg::OpenRecord)}
        />
    }
}

fn build_modals(component: &DashboardComponent, ctx: &Context<DashboardComponent>) -> Html {
    let link = ctx.link();
    let props = ctx.props();

    if let Some(record) = &component.emailing {
        return html! {
            <EmailModal
                client={props.client.clone()}
                record={record.clone()}
                fallback_url={props.email_fallback_url.clone()}
                on_close={link.callback(|_| Msg::CloseEmail)}
                on_sent={link.callback(Msg::EmailSent)}
            />
        };
    }

    match &component.selected {
        Some(record) => html! {
            <StatusUpdateModal
                key={record.warranty_id.clone()}
                client={props.client.clone()}
                record={record.clone()}
                user_email={props.user_email.clone()}
                on_close={link.callback(|_| Msg::CloseRecord)}
                on_saved={link.callback(|_| Msg::RecordSaved)}
                on_email={link.callback(Msg::OpenEmail)}
            />
        },
        None => html! {},
    }
}
