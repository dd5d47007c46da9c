mod config;
mod services;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info, warn};
use mime_guess::from_path;

use crate::config::Settings;
use crate::services::email::{Mailer, MailerState, SmtpMailer};
use crate::services::sandbox::{Sandbox, SandboxState};

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

/// Serves the embedded dashboard bundle; unknown paths get `index.html` so
/// client-side routes survive a reload.
async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

fn build_mailer(settings: &Settings) -> MailerState {
    let Some(smtp) = &settings.smtp else {
        info!("SMTP_HOST not set; email fallback disabled");
        return MailerState::default();
    };
    match SmtpMailer::new(smtp) {
        Ok(mailer) => {
            info!("Email fallback relays through {}:{}", smtp.host, smtp.port);
            let mailer: Arc<dyn Mailer> = Arc::new(mailer);
            MailerState::new(Some(mailer))
        }
        Err(e) => {
            error!("Cannot set up SMTP relay {}: {:?}", smtp.host, e);
            MailerState::default()
        }
    }
}

fn build_sandbox(settings: &Settings) -> Option<SandboxState> {
    if !settings.sandbox {
        return None;
    }
    let mut sandbox = Sandbox::new(&settings.sheets_api_token);
    if let Some(seed) = &settings.sandbox_seed {
        if let Err(e) = sandbox.seed_from_file(seed) {
            warn!("Sandbox starts empty: {}", e);
        }
    }
    info!("Sandbox enabled at {}", config::SANDBOX_PATH);
    Some(SandboxState::new(sandbox))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env();
    let runtime_config = settings.runtime_config();
    if let Err(e) = runtime_config.validate() {
        warn!("{}; the dashboard will refuse to start until this is fixed", e);
    }
    let url = settings.url();

    if settings.open_browser {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url);
        });
    }

    let mailer = build_mailer(&settings);
    let sandbox = build_sandbox(&settings);

    info!("Server running at {}", url);

    HttpServer::new(move || {
        let sandbox = sandbox.clone();
        App::new()
            .app_data(web::JsonConfig::default().limit(2 * 1024 * 1024))
            .app_data(web::FormConfig::default().limit(2 * 1024 * 1024))
            .app_data(web::Data::new(runtime_config.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .configure(move |cfg| {
                if let Some(state) = sandbox {
                    cfg.app_data(web::Data::new(state))
                        .service(services::sandbox::configure_routes());
                }
            })
            .service(services::runtime_config::configure_routes())
            .service(services::email::configure_routes())
            .default_service(web::route().to(serve_embedded))
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
