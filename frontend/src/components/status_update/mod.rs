//! Status-update modal for one warranty.
//!
//! Shows the per-stage follow-up snapshot and the append-only history, and
//! offers the workflow transitions (stages 1 to 3, review done) next to the
//! free-form edits: a follow-up note, the three workflow flags and the SKU.
//!
//! Loads are guarded by a `Generation` so a late response for a previous
//! record never lands in the form. A failed save keeps the typed remarks;
//! a successful one notifies the dashboard and closes the modal.

use yew::prelude::*;

mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use props::StatusUpdateProps;
pub use state::StatusUpdateModal;

use crate::tops_sheet::material_top_sheet::open_top_sheet;

impl Component for StatusUpdateModal {
    type Message = Msg;
    type Properties = StatusUpdateProps;

    fn create(ctx: &Context<Self>) -> Self {
        StatusUpdateModal::new(&ctx.props().record)
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            open_top_sheet(self.sheet_ref.clone());
            ctx.link().send_message(Msg::Load);
        }
    }
}
