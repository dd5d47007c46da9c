use common::dates::DateRange;
use common::error::DashboardError;
use common::gateway::summary_cache::SummaryMap;
use common::kpi::KpiKind;
use common::model::kpi::BackendKpi;
use common::model::warranty::WarrantyRecord;
use common::table::{ColumnFilters, SortField};
use serde_json::Value;

pub enum Msg {
    Refresh,
    ListLoaded {
        ticket: u64,
        result: Result<Vec<WarrantyRecord>, DashboardError>,
    },
    KpisLoaded {
        ticket: u64,
        todays: Result<BackendKpi, DashboardError>,
        first: Result<BackendKpi, DashboardError>,
    },
    SummariesLoaded {
        ticket: u64,
        ids: Vec<String>,
        result: Result<SummaryMap, DashboardError>,
    },
    SetRange(DateRange),
    SetBrand(String),
    SetSearchInput(String),
    SubmitSearch,
    SelectKpi(KpiKind),
    ClearAdHoc,
    SetFilters(ColumnFilters),
    ToggleSort(SortField),
    GoToPage(usize),
    OpenRecord(WarrantyRecord),
    CloseRecord,
    RecordSaved,
    OpenEmail(WarrantyRecord),
    CloseEmail,
    EmailSent(String),
    CardFlagSaved(Result<Value, DashboardError>),
    Logout,
}
