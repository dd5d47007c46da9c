use common::auth::{AuthGate, AuthState};
use common::config::RuntimeConfig;
use common::error::DashboardError;
use common::gateway::SheetsClient;
use log::{error, info};
use yew::platform::spawn_local;
use yew::{html, Component, Context, Html};

use crate::components::dashboard::DashboardComponent;
use crate::components::login::Login;
use crate::helpers::{show_toast, ToastKind};
use crate::services::{load_runtime_config, Client, GlooTransport, LocalStorageStore};

pub enum Msg {
    ConfigLoaded(Result<RuntimeConfig, DashboardError>),
    SignedIn(AuthState),
    Logout,
}

/// Root: configuration gate, then sign-in, then the dashboard.
pub struct App {
    config: Option<RuntimeConfig>,
    client: Option<Client>,
    fatal: Option<String>,
    auth: Option<AuthState>,
}

impl App {
    fn gate(&self) -> Option<AuthGate<LocalStorageStore>> {
        self.config
            .as_ref()
            .map(|config| AuthGate::new(LocalStorageStore, &config.allowed_email_domain))
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(Msg::ConfigLoaded(load_runtime_config().await));
        });
        Self {
            config: None,
            client: None,
            fatal: None,
            auth: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::ConfigLoaded(Ok(config)) => {
                info!("Runtime configuration loaded (sandbox: {})", config.sandbox);
                self.client = Some(SheetsClient::new(&config, GlooTransport));
                self.config = Some(config);
                self.auth = self.gate().and_then(|gate| gate.restore());
            }
            Msg::ConfigLoaded(Err(e)) => {
                error!("{}", e);
                self.fatal = Some(e.to_string());
            }
            Msg::SignedIn(state) => {
                self.auth = Some(state);
            }
            Msg::Logout => {
                if let Some(gate) = self.gate() {
                    gate.logout();
                }
                self.auth = None;
                show_toast("Signed out", ToastKind::Info);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if let Some(message) = &self.fatal {
            return html! {
                <div class="fatal-screen">
                    <div>
                        <h1>{"Configuration error"}</h1>
                        <p>{ message.clone() }</p>
                    </div>
                </div>
            };
        }
        let (Some(config), Some(client)) = (&self.config, &self.client) else {
            return html! { <p style="padding:1.5rem;">{"Loading configuration..."}</p> };
        };
        match &self.auth {
            None => html! {
                <Login
                    client_id={config.google_client_id.clone()}
                    allowed_domain={config.allowed_email_domain.clone()}
                    on_signed_in={ctx.link().callback(Msg::SignedIn)}
                />
            },
            Some(auth) => html! {
                <DashboardComponent
                    client={client.clone()}
                    user_email={auth.email.clone().unwrap_or_default()}
                    email_fallback_url={config.email_fallback_url.clone()}
                    on_logout={ctx.link().callback(|_| Msg::Logout)}
                />
            },
        }
    }
}
