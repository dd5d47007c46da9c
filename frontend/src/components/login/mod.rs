//! Sign-in screen.
//!
//! Google Identity Services hands back a JWT credential; `AuthGate` checks
//! its email against the allowed domain and persists the session before the
//! parent is told to show the dashboard.

mod gis;

use common::auth::{AuthGate, AuthState};
use gloo_timers::future::TimeoutFuture;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::helpers::{show_toast, ToastKind};
use crate::services::LocalStorageStore;

/// The script tag is async; give it a few seconds before giving up.
const GIS_RETRIES: u32 = 20;
const GIS_RETRY_MS: u32 = 250;

#[derive(Properties, PartialEq)]
pub struct LoginProps {
    pub client_id: String,
    pub allowed_domain: String,
    pub on_signed_in: Callback<AuthState>,
}

pub enum Msg {
    InitGis(u32),
    SignIn,
    Credential(String),
    GisFailed(String),
}

pub struct Login {
    gate: AuthGate<LocalStorageStore>,
    callback: Option<Closure<dyn FnMut(JsValue)>>,
    ready: bool,
    error: Option<String>,
    success: bool,
}

impl Component for Login {
    type Message = Msg;
    type Properties = LoginProps;

    fn create(ctx: &Context<Self>) -> Self {
        Login {
            gate: AuthGate::new(LocalStorageStore, &ctx.props().allowed_domain),
            callback: None,
            ready: false,
            error: None,
            success: false,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            ctx.link().send_message(Msg::InitGis(0));
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::InitGis(attempt) => {
                if !gis::available() {
                    if attempt >= GIS_RETRIES {
                        ctx.link().send_message(Msg::GisFailed(
                            "Google Sign-In could not be loaded. Check your connection and reload."
                                .to_string(),
                        ));
                    } else {
                        let link = ctx.link().clone();
                        spawn_local(async move {
                            TimeoutFuture::new(GIS_RETRY_MS).await;
                            link.send_message(Msg::InitGis(attempt + 1));
                        });
                    }
                    return false;
                }
                let link = ctx.link().clone();
                let callback = Closure::wrap(Box::new(move |response: JsValue| {
                    match gis::credential_of(&response) {
                        Some(credential) => link.send_message(Msg::Credential(credential)),
                        None => link.send_message(Msg::GisFailed(
                            "Sign-in response carried no credential".to_string(),
                        )),
                    }
                }) as Box<dyn FnMut(JsValue)>);
                match gis::initialize(&ctx.props().client_id, callback.as_ref().unchecked_ref()) {
                    Ok(()) => {
                        self.callback = Some(callback);
                        self.ready = true;
                    }
                    Err(e) => ctx.link().send_message(Msg::GisFailed(e)),
                }
                true
            }
            Msg::SignIn => {
                self.error = None;
                if let Err(e) = gis::prompt() {
                    ctx.link().send_message(Msg::GisFailed(e));
                }
                true
            }
            Msg::Credential(credential) => {
                match self.gate.authenticate(&credential) {
                    Ok(state) => {
                        self.success = true;
                        self.error = None;
                        show_toast(
                            "Authentication successful! Redirecting to dashboard...",
                            ToastKind::Success,
                        );
                        let on_signed_in = ctx.props().on_signed_in.clone();
                        spawn_local(async move {
                            TimeoutFuture::new(800).await;
                            on_signed_in.emit(state);
                        });
                    }
                    Err(e) => {
                        warn!("Sign-in refused: {}", e);
                        self.error = Some(e.to_string());
                    }
                }
                true
            }
            Msg::GisFailed(message) => {
                warn!("Google Sign-In: {}", message);
                self.error = Some(message);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let domain = self.gate.allowed_domain().to_string();
        html! {
            <div class="login-screen">
                <div class="login-card">
                    <h1>{"Warranty Dashboard"}</h1>
                    <p>{"Sign in with your company Google account"}</p>
                    <button
                        class="primary"
                        disabled={!self.ready || self.success}
                        onclick={ctx.link().callback(|_| Msg::SignIn)}
                    >
                        { if self.ready { "Sign in with Google" } else { "Loading Google Sign-In..." } }
                    </button>
                    <p class="kpi-description">{ format!("Only @{} email addresses are allowed", domain) }</p>
                    {
                        match &self.error {
                            Some(error) => html! { <p class="error-list">{ error.clone() }</p> },
                            None => html! {},
                        }
                    }
                </div>
            </div>
        }
    }
}
