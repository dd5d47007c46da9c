//! # Sandbox Service Module
//!
//! A development stand-in for the spreadsheet backend. It speaks the same
//! action protocol the dashboard uses in production (reads as query-string
//! `GET`s, writes as form-encoded `POST`s, the `{success, data?, error?}`
//! envelope) on top of the shared workflow engine, so the dashboard can be
//! run end to end without a deployed script.
//!
//! ## Sub-modules:
//! - `state`: the shared in-memory sheet and its seeding.
//! - `dispatch`: per-action behaviour and the response envelope.

mod dispatch;
pub mod state;

use actix_web::web::{self, get, post, scope};
use actix_web::{HttpResponse, Responder, Scope};
use chrono::{DateTime, Utc};
use common::error::DashboardError;
use common::gateway::{Action, Method};
use common::requests::Params;
use log::{info, warn};
use serde_json::Value;

use crate::config::SANDBOX_PATH;
use dispatch::envelope;
pub use state::{Sandbox, SandboxState};

/// Configures the sandbox scope. Only registered when `WM_SANDBOX` is set.
///
/// *   **`GET /api/sandbox?action=...`**:
///     - **Handler**: `query`
///     - **Description**: Read actions (`listWarranties`, `getHistory`,
///       `summaryBatch`, the KPI actions...), parameters in the query string.
///
/// *   **`POST /api/sandbox`**:
///     - **Handler**: `form`
///     - **Description**: Write actions with an `application/x-www-form-urlencoded`
///       body. A body without `action` is the plain registration update.
pub fn configure_routes() -> Scope {
    scope(SANDBOX_PATH)
        .route("", get().to(query))
        .route("", post().to(form))
}

pub(crate) async fn query(
    params: web::Query<Params>,
    state: web::Data<SandboxState>,
) -> impl Responder {
    respond(Method::Get, params.into_inner(), &state).await
}

pub(crate) async fn form(
    params: web::Form<Params>,
    state: web::Data<SandboxState>,
) -> impl Responder {
    respond(Method::Post, params.into_inner(), &state).await
}

async fn respond(method: Method, params: Params, state: &SandboxState) -> HttpResponse {
    let mut sandbox = state.sandbox.write().await;
    HttpResponse::Ok().json(answer(&mut sandbox, method, &params, Utc::now()))
}

/// Resolves the action of one request and runs it. Protocol errors are
/// answered inside the envelope with status 200, like the real backend.
pub fn answer(sandbox: &mut Sandbox, method: Method, params: &Params, now: DateTime<Utc>) -> Value {
    let name = params.get("action").map(String::as_str);
    let result = match Action::from_wire(name, method) {
        None => Err(DashboardError::Application(match name {
            Some(name) if !name.trim().is_empty() => format!("Unknown action: {}", name),
            _ => "Missing action".to_string(),
        })),
        Some(action) if action.method() != method => Err(DashboardError::Application(format!(
            "{} requires {}",
            action,
            action.method()
        ))),
        Some(action) => {
            info!("Sandbox {} {}", method, action);
            sandbox.handle(action, params, now)
        }
    };
    if let Err(err) = &result {
        warn!("Sandbox {} {:?} failed: {}", method, name, err);
    }
    envelope(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};
    use chrono::Duration;
    use common::config::RuntimeConfig;
    use common::error::WorkflowError;
    use common::gateway::{HttpRequest, SheetsClient, Transport, TransportResponse};
    use common::requests::ListFilter;
    use common::workflow::{Stage, WorkflowState};
    use futures_util::future::LocalBoxFuture;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    const SEED: &str = r#"[
        {"warrantyId":"W-1","brand":"Baybee","timestamp":"2024-06-08T10:00:00Z"},
        {"WarrantyID":"W-2","Brand":"Drogo","FollowUpStatus":"Follow-up 1 Done"}
    ]"#;

    fn seeded(token: &str) -> Sandbox {
        let mut sandbox = Sandbox::new(token);
        sandbox.seed_from_str(SEED).unwrap();
        sandbox
    }

    #[actix_web::test]
    async fn routes_reads_and_writes() {
        let state = SandboxState::new(seeded(""));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/sandbox?action=listWarranties&brand=Baybee")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["warrantyId"], "W-1");

        let req = actix_test::TestRequest::post()
            .uri("/api/sandbox")
            .set_form([("warrantyId", "W-1"), ("remark", "left voicemail")])
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["lastRemark"], "left voicemail");

        let req = actix_test::TestRequest::get()
            .uri("/api/sandbox?action=markFollowUp")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "markFollowUp requires POST");

        let req = actix_test::TestRequest::get().uri("/api/sandbox").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "Missing action");
    }

    /// Feeds client requests straight into a sandbox.
    struct InProcess {
        sandbox: Rc<RefCell<Sandbox>>,
        now: DateTime<Utc>,
    }

    fn decode_pairs(raw: &str) -> Params {
        web::Query::<HashMap<String, String>>::from_query(raw)
            .map(web::Query::into_inner)
            .unwrap_or_default()
    }

    impl Transport for InProcess {
        fn send(
            &self,
            request: HttpRequest,
        ) -> LocalBoxFuture<'static, Result<TransportResponse, DashboardError>> {
            let (method, raw) = match request.method {
                Method::Get => (
                    Method::Get,
                    request.url.split_once('?').map(|(_, q)| q.to_string()).unwrap_or_default(),
                ),
                Method::Post => (Method::Post, request.body.unwrap_or_default()),
            };
            let reply = answer(&mut self.sandbox.borrow_mut(), method, &decode_pairs(&raw), self.now);
            Box::pin(async move { Ok(TransportResponse::ok(reply.to_string())) })
        }
    }

    #[actix_web::test]
    async fn dashboard_client_round_trip() {
        let now = Utc::now();
        let sandbox = Rc::new(RefCell::new(seeded("tok")));
        let config = RuntimeConfig {
            sheets_api_base: SANDBOX_PATH.to_string(),
            sheets_api_token: "tok".to_string(),
            sandbox: true,
            ..Default::default()
        };
        let client = SheetsClient::with_clock(
            &config,
            InProcess {
                sandbox: Rc::clone(&sandbox),
                now,
            },
            Rc::new(move || now),
        );

        let rows = client.list_warranties(&ListFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
        let w2 = rows.iter().find(|r| r.warranty_id == "W-2").unwrap();
        let known = WorkflowState::from_record(w2, None);
        assert_eq!(known, WorkflowState::FollowUp1Done);

        let refused = client
            .complete_stage("W-2", Stage::Three, "", known, "agent@galaxyinc.in")
            .await
            .unwrap_err();
        assert_eq!(
            refused,
            DashboardError::Workflow(WorkflowError::OutOfOrder { stage: 3, requires: 2 })
        );

        let outcome = client
            .complete_stage("W-2", Stage::Two, "second call", known, "agent@galaxyinc.in")
            .await
            .unwrap();
        assert!(!outcome.already_done);
        assert_eq!(outcome.followups_done, 2);

        let summary = client.summary("W-2").await.unwrap();
        assert_eq!(summary.count, 2);

        let history = client.history("W-2").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "Follow-up 2 Done");
        assert_eq!(history[0].updated_by, "agent@galaxyinc.in");

        let kpi = client.first_followup_kpi().await.unwrap();
        assert_eq!(kpi.count, 1);
        assert!(kpi.as_of.is_some_and(|at| (at - now).abs() < Duration::seconds(1)));

        client
            .mark_review_done("W-1", "happy customer", "agent@galaxyinc.in")
            .await
            .unwrap();
        let details = client.customer_details("W-1").await.unwrap().unwrap();
        assert!(details.feedback_received && details.extended_warranty_sent);

        let email = client
            .send_warranty_email(&common::model::email::OutgoingEmail {
                to: "a@b.c".to_string(),
                subject: "s".to_string(),
                html_body: "b".to_string(),
                from_email: "f@b.c".to_string(),
                from_name: "F".to_string(),
                reply_to: None,
                customer: Default::default(),
            })
            .await;
        assert!(email.unwrap_err().is_application());
    }

    #[test]
    fn wrong_token_is_rejected_in_envelope() {
        let mut sandbox = seeded("tok");
        let params: Params = [("action".to_string(), "listWarranties".to_string())]
            .into_iter()
            .collect();
        let reply = answer(&mut sandbox, Method::Get, &params, Utc::now());
        assert_eq!(reply["success"], false);
        assert_eq!(reply["error"], "Unauthorized");
    }
}
