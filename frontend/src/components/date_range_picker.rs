use chrono::Local;
use common::dates::{describe_range, detect_preset, DateRange, Preset};
use yew::prelude::*;

use crate::helpers::{input_date, input_value, parse_input_date, select_value, show_toast, ToastKind};

#[derive(Properties, PartialEq)]
pub struct DateRangePickerProps {
    pub value: DateRange,
    pub on_change: Callback<DateRange>,
}

pub enum Msg {
    SelectPreset(String),
    SetFrom(String),
    SetTo(String),
    ApplyCustom,
}

/// Preset selector plus two day inputs for a custom range.
pub struct DateRangePicker {
    custom: bool,
    from: String,
    to: String,
}

impl DateRangePicker {
    fn sync_inputs(&mut self, range: &DateRange) {
        self.from = input_date(range.first_day());
        self.to = input_date(range.last_day());
    }
}

impl Component for DateRangePicker {
    type Message = Msg;
    type Properties = DateRangePickerProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut picker = DateRangePicker {
            custom: false,
            from: String::new(),
            to: String::new(),
        };
        picker.sync_inputs(&ctx.props().value);
        picker
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        if ctx.props().value != old_props.value {
            self.sync_inputs(&ctx.props().value);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let today = Local::now().date_naive();
        match msg {
            Msg::SelectPreset(key) => match Preset::from_key(&key) {
                Some(Preset::Custom) | None => {
                    self.custom = true;
                }
                Some(preset) => {
                    self.custom = false;
                    if let Some(range) = preset.range(today) {
                        ctx.props().on_change.emit(range);
                    }
                }
            },
            Msg::SetFrom(value) => self.from = value,
            Msg::SetTo(value) => self.to = value,
            Msg::ApplyCustom => {
                match (parse_input_date(&self.from), parse_input_date(&self.to)) {
                    (Some(first), Some(last)) => {
                        self.custom = false;
                        ctx.props().on_change.emit(DateRange::days(first, last));
                    }
                    _ => show_toast("Pick both a start and an end date", ToastKind::Error),
                }
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let today = Local::now().date_naive();
        let range = &ctx.props().value;
        let selected = if self.custom {
            Preset::Custom
        } else {
            detect_preset(range, today)
        };

        html! {
            <div class="range-picker">
                <span class="kpi-description">{ describe_range(range, today) }</span>
                <select onchange={link.callback(|e: Event| Msg::SelectPreset(select_value(&e)))}>
                    { for Preset::ALL.iter().map(|preset| html! {
                        <option value={preset.key()} selected={*preset == selected}>{ preset.label() }</option>
                    }) }
                </select>
                {
                    if selected == Preset::Custom {
                        html! {
                            <>
                                <input
                                    type="date"
                                    value={self.from.clone()}
                                    oninput={link.callback(|e: InputEvent| Msg::SetFrom(input_value(&e)))}
                                />
                                <input
                                    type="date"
                                    value={self.to.clone()}
                                    oninput={link.callback(|e: InputEvent| Msg::SetTo(input_value(&e)))}
                                />
                                <button onclick={link.callback(|_| Msg::ApplyCustom)}>{"Apply"}</button>
                            </>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        }
    }
}
