use common::model::warranty::{Brand, FollowUpStatus};
use common::table::{ColumnFilters, DoneFilter, FlagFilter};
use yew::prelude::*;

use super::messages::{FilterKey, Msg};
use super::state::CustomerTable;
use crate::tops_sheet::material_top_sheet::{close_top_sheet, open_top_sheet};

pub fn update(component: &mut CustomerTable, ctx: &Context<CustomerTable>, msg: Msg) -> bool {
    match msg {
        Msg::SetFilter(key, value) => {
            let mut filters = ctx.props().query.filters.clone();
            apply_filter(&mut filters, key, &value);
            ctx.props().on_filters.emit(filters);
            false
        }
        Msg::ClearFilters => {
            ctx.props().on_filters.emit(ColumnFilters::default());
            false
        }
        Msg::ToggleFilterRow => {
            component.show_filters = !component.show_filters;
            true
        }
        Msg::OpenChooser => {
            open_top_sheet(component.chooser_ref.clone());
            false
        }
        Msg::CloseChooser => {
            close_top_sheet(component.chooser_ref.clone());
            false
        }
        Msg::ToggleColumn(id, visible) => {
            component.prefs.toggle(id, visible);
            component.save_prefs();
            true
        }
        Msg::MoveColumn(id, offset) => {
            let mut order = component.prefs.order.clone();
            let Some(from) = order.iter().position(|existing| existing == id) else {
                return false;
            };
            let to = from.saturating_add_signed(offset);
            if to >= order.len() || to == from {
                return false;
            }
            order.swap(from, to);
            component.prefs.reorder(order);
            component.save_prefs();
            true
        }
        Msg::ResetColumns => {
            component.prefs.reset_to_defaults();
            component.save_prefs();
            true
        }
    }
}

/// Writes one select's value into the filter set. Unknown keys mean "All".
pub fn apply_filter(filters: &mut ColumnFilters, key: FilterKey, value: &str) {
    match key {
        FilterKey::Brand => filters.brand = Brand::parse(value),
        FilterKey::WarrantyCardSent => filters.warranty_card_sent = FlagFilter::from_key(value),
        FilterKey::FeedbackReceived => filters.feedback_received = FlagFilter::from_key(value),
        FilterKey::ExtendedWarrantySent => {
            filters.extended_warranty_sent = FlagFilter::from_key(value)
        }
        FilterKey::FollowUpStatus => filters.follow_up_status = FollowUpStatus::parse(value),
        FilterKey::FollowUpsDone => filters.followups_done = DoneFilter::from_key(value),
        FilterKey::DueToday => filters.due_today = FlagFilter::from_key(value),
    }
}
