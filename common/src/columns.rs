//! Customer-table column definitions and the user's column preferences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, load_json, save_json};
use crate::table::SortField;

pub const COLUMNS_STORAGE_KEY: &str = "wm.table.columns.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: &'static str,
    pub label: &'static str,
    pub default_visible: bool,
    /// Sort applied when the header is clicked; `None` for static headers.
    pub sort: Option<SortField>,
}

pub const COLUMN_DEFS: [ColumnDef; 13] = [
    ColumnDef {
        id: "warrantyId",
        label: "Warranty ID",
        default_visible: true,
        sort: None,
    },
    ColumnDef {
        id: "timestamp",
        label: "Timestamp",
        default_visible: true,
        sort: Some(SortField::Timestamp),
    },
    ColumnDef {
        id: "brand",
        label: "Brand",
        default_visible: true,
        sort: Some(SortField::Brand),
    },
    ColumnDef {
        id: "customer",
        label: "Customer",
        default_visible: true,
        sort: Some(SortField::CustomerName),
    },
    ColumnDef {
        id: "contact",
        label: "Contact",
        default_visible: true,
        sort: None,
    },
    ColumnDef {
        id: "product",
        label: "Product",
        default_visible: true,
        sort: None,
    },
    ColumnDef {
        id: "purchasedFrom",
        label: "Purchased From",
        default_visible: true,
        sort: Some(SortField::PurchasedFrom),
    },
    ColumnDef {
        id: "warrantyCardSent",
        label: "Warranty Card Sent",
        default_visible: true,
        sort: Some(SortField::WarrantyCardSent),
    },
    ColumnDef {
        id: "feedbackReceived",
        label: "Feedback Received",
        default_visible: true,
        sort: Some(SortField::FeedbackReceived),
    },
    ColumnDef {
        id: "extendedSent",
        label: "Extended Warranty Sent",
        default_visible: true,
        sort: Some(SortField::ExtendedWarrantySent),
    },
    ColumnDef {
        id: "nry24",
        label: "24h NRY",
        default_visible: false,
        sort: Some(SortField::Nry24),
    },
    ColumnDef {
        id: "followUpStatus",
        label: "Follow-Up Status",
        default_visible: true,
        sort: Some(SortField::FollowUpStatus),
    },
    ColumnDef {
        id: "followUpsDone",
        label: "Follow-ups Done",
        default_visible: true,
        sort: Some(SortField::FollowUpsDone),
    },
];

pub fn column_def(id: &str) -> Option<&'static ColumnDef> {
    COLUMN_DEFS.iter().find(|def| def.id == id)
}

/// Visible set plus display order, as persisted in client storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPreferences {
    #[serde(default)]
    pub visible: BTreeMap<String, bool>,
    #[serde(default)]
    pub order: Vec<String>,
}

impl Default for ColumnPreferences {
    fn default() -> Self {
        ColumnPreferences {
            visible: COLUMN_DEFS
                .iter()
                .map(|def| (def.id.to_string(), def.default_visible))
                .collect(),
            order: COLUMN_DEFS
                .iter()
                .filter(|def| def.default_visible)
                .map(|def| def.id.to_string())
                .collect(),
        }
    }
}

impl ColumnPreferences {
    /// Stored preferences merged onto the current definitions, or the
    /// defaults when nothing usable is stored.
    pub fn load(store: &impl KeyValueStore) -> Self {
        load_json::<ColumnPreferences>(store, COLUMNS_STORAGE_KEY)
            .map(|stored| stored.merged())
            .unwrap_or_default()
    }

    pub fn save(&self, store: &impl KeyValueStore) {
        save_json(store, COLUMNS_STORAGE_KEY, self);
    }

    /// Keeps the user's choices for known columns, gives new columns their
    /// default visibility and drops ids that no longer exist. Stored order is
    /// kept for visible ids; visible ids missing from it are appended in
    /// definition order.
    pub fn merged(self) -> Self {
        let visible: BTreeMap<String, bool> = COLUMN_DEFS
            .iter()
            .map(|def| {
                let shown = self.visible.get(def.id).copied().unwrap_or(def.default_visible);
                (def.id.to_string(), shown)
            })
            .collect();
        let is_shown = |id: &str| visible.get(id).copied().unwrap_or(false);

        let mut order: Vec<String> = Vec::new();
        for id in self.order {
            if is_shown(&id) && !order.contains(&id) {
                order.push(id);
            }
        }
        for def in COLUMN_DEFS.iter() {
            if is_shown(def.id) && !order.iter().any(|id| id == def.id) {
                order.push(def.id.to_string());
            }
        }
        ColumnPreferences { visible, order }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    /// Shows a column at the end of the order, or hides it.
    pub fn toggle(&mut self, id: &str, visible: bool) {
        if column_def(id).is_none() {
            return;
        }
        self.visible.insert(id.to_string(), visible);
        self.order.retain(|existing| existing != id);
        if visible {
            self.order.push(id.to_string());
        }
    }

    /// Replaces the order; unknown and hidden ids are ignored.
    pub fn reorder(&mut self, order: Vec<String>) {
        self.order = order;
        *self = self.clone().merged();
    }

    pub fn reset_to_defaults(&mut self) {
        *self = ColumnPreferences::default();
    }

    /// Definitions of the visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&'static ColumnDef> {
        self.order
            .iter()
            .filter(|id| self.is_visible(id))
            .filter_map(|id| column_def(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn column_ids_are_unique_and_resolvable() {
        for def in &COLUMN_DEFS {
            assert_eq!(column_def(def.id), Some(def));
        }
        assert_eq!(
            column_def("customer").and_then(|def| def.sort),
            Some(SortField::CustomerName)
        );
        assert_eq!(column_def("contact").and_then(|def| def.sort), None);
        assert_eq!(column_def("missing"), None);
    }

    #[test]
    fn defaults_hide_only_nry24() {
        let prefs = ColumnPreferences::default();
        assert_eq!(prefs.visible_columns().len(), 12);
        assert!(!prefs.is_visible("nry24"));
    }

    #[test]
    fn stored_choices_survive_and_new_columns_get_defaults() {
        let store = MemoryStore::new();
        store
            .set(
                COLUMNS_STORAGE_KEY,
                r#"{"visible":{"brand":false,"nry24":true,"legacy":true},
                    "order":["nry24","legacy","timestamp","brand"]}"#,
            )
            .unwrap();
        let prefs = ColumnPreferences::load(&store);
        assert!(!prefs.is_visible("brand"));
        assert!(prefs.is_visible("followUpsDone"));
        assert!(!prefs.visible.contains_key("legacy"));
        assert_eq!(&prefs.order[..2], &["nry24".to_string(), "timestamp".to_string()]);
        assert_eq!(prefs.order[2], "warrantyId");
        assert!(!prefs.order.contains(&"brand".to_string()));
    }

    #[test]
    fn toggle_and_reset_persist() {
        let store = MemoryStore::new();
        let mut prefs = ColumnPreferences::load(&store);
        prefs.toggle("warrantyId", false);
        prefs.toggle("warrantyId", true);
        prefs.toggle("bogus", true);
        assert_eq!(prefs.order.last().map(String::as_str), Some("warrantyId"));
        prefs.save(&store);
        assert_eq!(ColumnPreferences::load(&store), prefs);

        prefs.reset_to_defaults();
        assert_eq!(prefs, ColumnPreferences::default());
    }

    #[test]
    fn malformed_storage_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(COLUMNS_STORAGE_KEY, "[1,2").unwrap();
        assert_eq!(ColumnPreferences::load(&store), ColumnPreferences::default());
    }
}
