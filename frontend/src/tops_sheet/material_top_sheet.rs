use uuid::Uuid;
use web_sys::HtmlElement;
use yew::{html, Component, Context, Html, NodeRef, Properties};

/// Full-screen overlay hosting a modal panel. Hidden until `open_top_sheet`
/// adds the `show` class.
pub struct MaterialTopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
}

impl Component for MaterialTopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("id-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="top-sheet" id={self.id.clone()} ref={ctx.props().node_ref.clone()}>
                <div class="sheet-panel">
                    { ctx.props().children.clone() }
                </div>
            </div>
        }
    }
}

/// Shows the sheet on the next tick so the CSS transition runs.
pub fn open_top_sheet(top_sheet_ref: NodeRef) {
    if let Some(top_sheet) = top_sheet_ref.cast::<HtmlElement>() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(50).await;
            top_sheet.class_list().add_1("show").ok();
        });
    }
}

pub fn close_top_sheet(top_sheet_ref: NodeRef) {
    if let Some(top_sheet) = top_sheet_ref.cast::<HtmlElement>() {
        top_sheet.class_list().remove_1("show").ok();
    }
}
