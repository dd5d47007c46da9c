use actix_web::{web, HttpResponse, Responder};
use common::model::email::EmailSendResult;
use log::{error, info, warn};

use super::mailer::{MailError, MailerState, SendRequest};

fn failure(error: impl Into<String>) -> EmailSendResult {
    EmailSendResult {
        success: false,
        message_id: None,
        error: Some(error.into()),
    }
}

/// Handler for `POST /api/email/send`.
///
/// SMTP delivery is blocking, so it runs on the blocking thread pool.
pub(crate) async fn process(
    request: web::Json<SendRequest>,
    state: web::Data<MailerState>,
) -> impl Responder {
    let Some(mailer) = state.mailer.clone() else {
        warn!("Email fallback requested but SMTP is not configured");
        return HttpResponse::ServiceUnavailable().json(failure("SMTP not configured"));
    };

    let request = request.into_inner();
    let recipient = request.to.clone();
    info!("Sending fallback email to {}", recipient);

    match web::block(move || mailer.send(&request)).await {
        Ok(Ok(message_id)) => {
            info!("Fallback email to {} accepted as {}", recipient, message_id);
            HttpResponse::Ok().json(EmailSendResult {
                success: true,
                message_id: Some(message_id),
                error: None,
            })
        }
        Ok(Err(MailError::Invalid(reason))) => {
            warn!("Rejected fallback email to {}: {}", recipient, reason);
            HttpResponse::BadRequest().json(failure(reason))
        }
        Ok(Err(MailError::Relay(reason))) => {
            error!("SMTP relay failed for {}: {}", recipient, reason);
            HttpResponse::BadGateway().json(failure(reason))
        }
        Err(e) => {
            error!("Email worker failed: {}", e);
            HttpResponse::InternalServerError().json(failure(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::configure_routes;
    use super::super::mailer::{build_message, Mailer};
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, request: &SendRequest) -> Result<String, MailError> {
            let (_, id) = build_message(request)?;
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(request.to.clone());
            }
            Ok(id)
        }
    }

    fn body() -> serde_json::Value {
        json!({
            "to": "asha@example.com",
            "subject": "Your Drogo Warranty Card - W-7",
            "htmlBody": "<p>Hi</p>",
            "fromEmail": "care@drogo.example",
            "fromName": "Drogo",
            "customer": { "warrantyId": "W-7" }
        })
    }

    #[actix_web::test]
    async fn unconfigured_smtp_is_service_unavailable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(MailerState::default()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/email/send")
            .set_json(body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let result: EmailSendResult = test::read_body_json(resp).await;
        assert_eq!(result.error.as_deref(), Some("SMTP not configured"));
    }

    #[actix_web::test]
    async fn relays_through_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let shared: Arc<dyn Mailer> = mailer.clone();
        let state = MailerState::new(Some(shared));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/email/send")
            .set_json(body())
            .to_request();
        let result: EmailSendResult = test::call_and_read_body_json(&app, req).await;
        assert!(result.success);
        assert!(result.message_id.unwrap().ends_with("@drogo.example>"));
        assert_eq!(mailer.sent.lock().unwrap().as_slice(), ["asha@example.com"]);

        let mut bad = body();
        bad["to"] = json!("nobody");
        let req = test::TestRequest::post()
            .uri("/api/email/send")
            .set_json(bad)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
