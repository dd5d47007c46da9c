//! Column chooser shown in a top sheet: visibility toggles, ordering and a
//! reset to the default layout.

use common::columns::COLUMN_DEFS;
use yew::html::Scope;
use yew::prelude::*;

use super::messages::Msg;
use super::state::CustomerTable;
use crate::helpers::checkbox_value;
use crate::tops_sheet::material_top_sheet::MaterialTopSheet;

pub fn column_chooser(component: &CustomerTable, link: &Scope<CustomerTable>) -> Html {
    let prefs = &component.prefs;

    html! {
        <MaterialTopSheet node_ref={component.chooser_ref.clone()}>
            <div class="column-chooser">
                <div class="sheet-header">
                    <h3>{ "Columns" }</h3>
                    <button onclick={link.callback(|_| Msg::CloseChooser)}>{ "Close" }</button>
                </div>

                <h4>{ "Shown" }</h4>
                <ul>
                    { for prefs.visible_columns().into_iter().enumerate().map(|(index, def)| {
                        let id = def.id;
                        let last = index + 1 == prefs.order.len();
                        html! {
                            <li>
                                <input
                                    type="checkbox"
                                    checked={true}
                                    onchange={link.callback(move |e: Event| Msg::ToggleColumn(id, checkbox_value(&e)))}
                                />
                                { def.label }
                                <button disabled={index == 0}
                                    onclick={link.callback(move |_| Msg::MoveColumn(id, -1))}>{ "↑" }</button>
                                <button disabled={last}
                                    onclick={link.callback(move |_| Msg::MoveColumn(id, 1))}>{ "↓" }</button>
                            </li>
                        }
                    }) }
                </ul>

                <h4>{ "Hidden" }</h4>
                <ul>
                    { for COLUMN_DEFS.iter().filter(|def| !prefs.is_visible(def.id)).map(|def| {
                        let id = def.id;
                        html! {
                            <li>
                                <input
                                    type="checkbox"
                                    checked={false}
                                    onchange={link.callback(move |e: Event| Msg::ToggleColumn(id, checkbox_value(&e)))}
                                />
                                { def.label }
                            </li>
                        }
                    }) }
                </ul>

                <button onclick={link.callback(|_| Msg::ResetColumns)}>{ "Reset to defaults" }</button>
            </div>
        </MaterialTopSheet>
    }
}
