use common::model::warranty::WarrantyRecord;
use yew::prelude::*;

use crate::services::Client;

#[derive(Properties, PartialEq, Clone)]
pub struct StatusUpdateProps {
    pub client: Client,
    pub record: WarrantyRecord,
    pub user_email: String,
    pub on_close: Callback<()>,
    /// Fired after any successful write so the list is reloaded.
    pub on_saved: Callback<()>,
    /// Opens the warranty-card email for this record.
    pub on_email: Callback<WarrantyRecord>,
}
