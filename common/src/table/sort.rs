//! Field-driven comparator for the customer table.

use std::cmp::Ordering;

use crate::model::warranty::WarrantyRecord;
use crate::table::filters::Summaries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Timestamp,
    Brand,
    CustomerName,
    PurchasedFrom,
    WarrantyCardSent,
    FeedbackReceived,
    ExtendedWarrantySent,
    Nry24,
    FollowUpStatus,
    FollowUpsDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Newest registrations first.
    fn default() -> Self {
        SortState {
            field: SortField::Timestamp,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Header click: flips the active field, otherwise selects `field`
    /// descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            *self = SortState {
                field,
                direction: SortDirection::Desc,
            };
        }
    }

    pub fn compare(
        &self,
        a: &WarrantyRecord,
        b: &WarrantyRecord,
        summaries: &Summaries,
    ) -> Ordering {
        let dir = self.direction;
        match self.field {
            SortField::Timestamp => dir.apply(a.timestamp.cmp(&b.timestamp)),
            SortField::Brand => dir.apply(
                a.brand
                    .map(|brand| brand.as_str())
                    .unwrap_or("")
                    .cmp(b.brand.map(|brand| brand.as_str()).unwrap_or("")),
            ),
            SortField::CustomerName => dir.apply(text_cmp(&a.customer_name, &b.customer_name)),
            SortField::PurchasedFrom => dir.apply(text_cmp(&a.purchased_from, &b.purchased_from)),
            SortField::WarrantyCardSent => {
                dir.apply(a.warranty_card_sent.cmp(&b.warranty_card_sent))
            }
            SortField::FeedbackReceived => dir.apply(a.feedback_received.cmp(&b.feedback_received)),
            SortField::ExtendedWarrantySent => {
                dir.apply(a.extended_warranty_sent.cmp(&b.extended_warranty_sent))
            }
            SortField::Nry24 => dir.apply(text_cmp(&a.nry24, &b.nry24)),
            SortField::FollowUpStatus => dir.apply(a.follow_up_status.cmp(&b.follow_up_status)),
            SortField::FollowUpsDone => match (a.feedback_received, b.feedback_received) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => dir.apply(
                    a.followups_count(summaries.get(&a.warranty_id))
                        .cmp(&b.followups_count(summaries.get(&b.warranty_id))),
                ),
            },
        }
    }
}

fn text_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable in-place sort; equal keys keep their incoming order.
pub fn sort_rows(rows: &mut [&WarrantyRecord], sort: &SortState, summaries: &Summaries) {
    rows.sort_by(|a, b| sort.compare(a, b, summaries));
}
