//! Client for the spreadsheet action protocol.
//!
//! Reads go out as query-string `GET`s, writes as form-encoded `POST`s; both
//! carry the shared token and an `action` selector (the plain update omits
//! it). Every response is read as text first so an HTML page (login
//! redirect, misconfigured deployment) is reported as such instead of as a
//! JSON syntax error.
//!
//! The client is transport-agnostic: the browser build plugs in a `fetch`
//! based `Transport`, tests use in-memory fakes.

pub mod client;
pub mod request;
pub mod response;
pub mod summary_cache;

use std::fmt;

pub use client::{SheetsClient, Transport};
pub use request::{ApiRequest, HttpRequest, Method};
pub use response::{TransportResponse, parse_body, unwrap_envelope};
pub use summary_cache::{SUMMARY_TTL_SECS, SummaryCache};

/// Backend actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListWarranties,
    /// Plain registration patch; sent without an `action` field.
    UpdateWarranty,
    LogFollowUpAction,
    UpdateReviewAndTriggerCard,
    UpdateBooleanFlags,
    GetHistory,
    GetFollowupState,
    GetCustomerDetails,
    SummaryBatch,
    FirstFollowupKpi,
    TodaysFollowupsKpi,
    ListFirstFollowups,
    ListTodaysFollowups,
    Evaluate24Nry,
    UpdateFollowUpStatus,
    MarkFollowUp,
    UpdateSku,
    SendWarrantyEmail,
}

impl Action {
    pub const ALL: [Action; 18] = [
        Action::ListWarranties,
        Action::UpdateWarranty,
        Action::LogFollowUpAction,
        Action::UpdateReviewAndTriggerCard,
        Action::UpdateBooleanFlags,
        Action::GetHistory,
        Action::GetFollowupState,
        Action::GetCustomerDetails,
        Action::SummaryBatch,
        Action::FirstFollowupKpi,
        Action::TodaysFollowupsKpi,
        Action::ListFirstFollowups,
        Action::ListTodaysFollowups,
        Action::Evaluate24Nry,
        Action::UpdateFollowUpStatus,
        Action::MarkFollowUp,
        Action::UpdateSku,
        Action::SendWarrantyEmail,
    ];

    /// Value of the `action` field; `None` for the implicit update.
    pub fn wire_name(&self) -> Option<&'static str> {
        Some(match self {
            Action::ListWarranties => "listWarranties",
            Action::UpdateWarranty => return None,
            Action::LogFollowUpAction => "logFollowUpAction",
            Action::UpdateReviewAndTriggerCard => "updateReviewAndTriggerCard",
            Action::UpdateBooleanFlags => "updateBooleanFlags",
            Action::GetHistory => "getHistory",
            Action::GetFollowupState => "getFollowupState",
            Action::GetCustomerDetails => "getCustomerDetails",
            Action::SummaryBatch => "summaryBatch",
            Action::FirstFollowupKpi => "firstFollowupKpi",
            Action::TodaysFollowupsKpi => "todaysFollowupsKpi",
            Action::ListFirstFollowups => "listFirstFollowups",
            Action::ListTodaysFollowups => "listTodaysFollowups",
            Action::Evaluate24Nry => "evaluate24NRY",
            Action::UpdateFollowUpStatus => "updateFollowUpStatus",
            Action::MarkFollowUp => "markFollowUp",
            Action::UpdateSku => "updateSku",
            Action::SendWarrantyEmail => "sendWarrantyEmail",
        })
    }

    /// Resolves the `action` field of an incoming request. A missing field
    /// on a `POST` is the implicit update.
    pub fn from_wire(name: Option<&str>, method: Method) -> Option<Action> {
        match name.map(str::trim).filter(|name| !name.is_empty()) {
            None if method == Method::Post => Some(Action::UpdateWarranty),
            None => None,
            Some(name) => Action::ALL
                .into_iter()
                .find(|action| action.wire_name() == Some(name)),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Action::ListWarranties
            | Action::GetHistory
            | Action::GetFollowupState
            | Action::GetCustomerDetails
            | Action::SummaryBatch
            | Action::FirstFollowupKpi
            | Action::TodaysFollowupsKpi
            | Action::ListFirstFollowups
            | Action::ListTodaysFollowups
            | Action::Evaluate24Nry => Method::Get,
            Action::UpdateWarranty
            | Action::LogFollowUpAction
            | Action::UpdateReviewAndTriggerCard
            | Action::UpdateBooleanFlags
            | Action::UpdateFollowUpStatus
            | Action::MarkFollowUp
            | Action::UpdateSku
            | Action::SendWarrantyEmail => Method::Post,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name().unwrap_or("updateWarranty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_resolve_back() {
        for action in Action::ALL {
            assert_eq!(Action::from_wire(action.wire_name(), action.method()), Some(action));
        }
        assert_eq!(Action::from_wire(None, Method::Get), None);
        assert_eq!(Action::from_wire(Some("dropTables"), Method::Post), None);
    }
}
