use common::columns::ColumnPreferences;
use yew::NodeRef;

use crate::services::LocalStorageStore;

pub struct CustomerTable {
    pub prefs: ColumnPreferences,
    pub show_filters: bool,
    pub chooser_ref: NodeRef,
}

impl CustomerTable {
    pub fn new() -> Self {
        Self {
            prefs: ColumnPreferences::load(&LocalStorageStore),
            show_filters: false,
            chooser_ref: NodeRef::default(),
        }
    }

    pub fn save_prefs(&self) {
        self.prefs.save(&LocalStorageStore);
    }
}
