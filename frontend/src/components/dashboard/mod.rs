//! Dashboard: root module wiring the Yew `Component` implementation with
//! submodules for state, messages, update logic and view rendering.
//!
//! Responsibilities
//! - Own the loaded registration list, the scope (date range and brand) and
//!   the table query, and re-run the table pipeline whenever one changes.
//! - Compose the KPI cards from the scoped list and the backend aggregates.
//! - Host the status-update and warranty-card email modals.
//! - On first render, ask the backend to refresh the 24h markers, then load.

use log::warn;
use yew::platform::spawn_local;
use yew::prelude::*;

mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::DashboardProps;
pub use state::DashboardComponent;

impl Component for DashboardComponent {
    type Message = Msg;
    type Properties = DashboardProps;

    fn create(_ctx: &Context<Self>) -> Self {
        DashboardComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let client = ctx.props().client.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                if let Err(e) = client.evaluate_nry24().await {
                    warn!("24h marker refresh skipped: {}", e);
                }
                link.send_message(Msg::Refresh);
            });
        }
    }
}
