use std::collections::HashSet;

use common::model::warranty::WarrantyRecord;
use common::table::{ColumnFilters, SortField, Summaries, TableQuery};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CustomerTableProps {
    /// Rows of the current page, already filtered and sorted.
    pub rows: Vec<WarrantyRecord>,
    /// Matching rows across all pages.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub query: TableQuery,
    pub summaries: Summaries,
    /// Ids whose follow-up count is still being fetched.
    #[prop_or_default]
    pub summary_loading: HashSet<String>,
    pub on_filters: Callback<ColumnFilters>,
    pub on_sort: Callback<SortField>,
    pub on_page: Callback<usize>,
    pub on_open: Callback<WarrantyRecord>,
}
