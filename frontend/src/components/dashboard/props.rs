use yew::prelude::*;

use crate::services::Client;

#[derive(Properties, PartialEq, Clone)]
pub struct DashboardProps {
    pub client: Client,
    /// Signed-in operator; recorded as `updatedBy` on every write.
    pub user_email: String,
    pub email_fallback_url: String,
    pub on_logout: Callback<()>,
}
