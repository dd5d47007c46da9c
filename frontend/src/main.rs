use crate::app::App;

mod app;
mod components;
mod helpers;
mod logger;
mod services;
mod tops_sheet;

fn main() {
    logger::init();
    yew::Renderer::<App>::new().render();
}
