//! Customer table: paged rows with per-column filters, sortable headers and
//! a column chooser whose choices persist in local storage.
//!
//! The table owns only presentation state (column preferences, whether the
//! filter row is shown). Filtering, sorting and paging are computed by the
//! dashboard; this component reports user intent through its callbacks.

use yew::prelude::*;

mod column_chooser;
mod messages;
mod props;
mod state;
mod update;
mod view;

pub use messages::{FilterKey, Msg};
pub use props::CustomerTableProps;
pub use state::CustomerTable;

impl Component for CustomerTable {
    type Message = Msg;
    type Properties = CustomerTableProps;

    fn create(_ctx: &Context<Self>) -> Self {
        CustomerTable::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }
}
