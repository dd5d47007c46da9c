use common::kpi::{KpiKind, KpiSnapshot};
use yew::{classes, html, Callback, Component, Context, Html, Properties};

use crate::helpers::format_count;

#[derive(Properties, PartialEq)]
pub struct KpiCardsProps {
    pub snapshot: KpiSnapshot,
    /// Card whose filter currently narrows the table.
    pub active: Option<KpiKind>,
    pub on_select: Callback<KpiKind>,
}

/// Row of metric cards. Clickable cards narrow the table; the rest are
/// informational.
pub struct KpiCards;

impl Component for KpiCards {
    type Message = ();
    type Properties = KpiCardsProps;

    fn create(_ctx: &Context<Self>) -> Self {
        KpiCards
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        html! {
            <div class="kpi-grid">
                { for KpiKind::ALL.into_iter().map(|kind| {
                    let clickable = kind.clickable();
                    let onclick = {
                        let on_select = props.on_select.clone();
                        Callback::from(move |_| {
                            if clickable {
                                on_select.emit(kind);
                            }
                        })
                    };
                    html! {
                        <div
                            class={classes!(
                                "kpi-card",
                                clickable.then_some("clickable"),
                                (props.active == Some(kind)).then_some("active"),
                            )}
                            title={ if clickable { "Click to filter the table" } else { "" } }
                            {onclick}
                        >
                            <div class="kpi-description">{ kind.title() }</div>
                            <div class="kpi-value">{ format_count(props.snapshot.value(kind)) }</div>
                            <div class="kpi-description">{ props.snapshot.description(kind) }</div>
                        </div>
                    }
                }) }
            </div>
        }
    }
}
