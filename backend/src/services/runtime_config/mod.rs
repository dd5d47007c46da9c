//! # Runtime Configuration Service
//!
//! Publishes the frontend-facing settings as `GET /config.json`. The
//! dashboard fetches this document once before it renders anything and
//! refuses to start when it is missing or invalid, so the handler always
//! answers with the document and leaves validation to the client.

use actix_web::web::{get, resource, Data};
use actix_web::{HttpResponse, Resource, Responder};
use common::config::RuntimeConfig;

const CONFIG_PATH: &str = "/config.json";

/// Registers `GET /config.json`.
///
/// The handler reads the `RuntimeConfig` stored as application data.
pub fn configure_routes() -> Resource {
    resource(CONFIG_PATH).route(get().to(process))
}

pub(crate) async fn process(config: Data<RuntimeConfig>) -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(config.get_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn serves_published_settings() {
        let config = RuntimeConfig {
            sheets_api_base: "/api/sandbox".to_string(),
            sheets_api_token: "tok".to_string(),
            sandbox: true,
            ..Default::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(Data::new(config.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri(CONFIG_PATH).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["SHEETS_API_BASE"], "/api/sandbox");
        assert_eq!(body["SANDBOX"], true);

        let parsed = RuntimeConfig::parse(&body.to_string()).unwrap();
        assert_eq!(parsed, config);
    }
}
