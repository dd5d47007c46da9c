use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RuntimeConfig;
use crate::error::DashboardError;
use crate::gateway::request::{ApiRequest, HttpRequest};
use crate::gateway::response::{TransportResponse, parse_body, unwrap_envelope};
use crate::gateway::summary_cache::{SummaryCache, SummaryMap};
use crate::gateway::Action;
use crate::model::email::{EmailSendResult, OutgoingEmail};
use crate::model::followup::{FollowUpState, FollowUpSummary, HistoryEntry, StageOutcome};
use crate::model::kpi::BackendKpi;
use crate::model::warranty::WarrantyRecord;
use crate::normalize::{normalize_rows, normalize_value};
use crate::requests::{BooleanFlags, FollowUpLogEntry, ListFilter, SkuUpdate, WarrantyPatch};
use crate::workflow::{Stage, Transition, WorkflowState};

/// Sends one HTTP request. Implementations never inspect the body; status
/// and content checks happen in `parse_body`.
pub trait Transport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> LocalBoxFuture<'static, Result<TransportResponse, DashboardError>>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> LocalBoxFuture<'static, Result<TransportResponse, DashboardError>> {
        (**self).send(request)
    }
}

type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

struct Inner<T> {
    transport: T,
    base: String,
    token: String,
    summaries: SummaryCache,
    clock: Clock,
}

/// Typed client over the action protocol. Cheap to clone; clones share the
/// transport and the summary cache.
pub struct SheetsClient<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for SheetsClient<T> {
    fn clone(&self) -> Self {
        SheetsClient {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for SheetsClient<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

fn decode<D: DeserializeOwned>(value: Value) -> Result<D, DashboardError> {
    serde_json::from_value(value).map_err(|err| DashboardError::InvalidJson(err.to_string()))
}

impl<T: Transport + 'static> SheetsClient<T> {
    /// Builds a client from a validated configuration; there is no other way
    /// to obtain one, so no call can precede configuration loading.
    pub fn new(config: &RuntimeConfig, transport: T) -> Self {
        SheetsClient::with_clock(config, transport, Rc::new(Utc::now))
    }

    pub fn with_clock(config: &RuntimeConfig, transport: T, clock: Clock) -> Self {
        SheetsClient {
            inner: Rc::new(Inner {
                transport,
                base: config.sheets_api_base.clone(),
                token: config.sheets_api_token.clone(),
                summaries: SummaryCache::default(),
                clock,
            }),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.inner.clock)()
    }

    /// Sends a request and returns the unwrapped envelope payload.
    pub fn call(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<Value, DashboardError>> {
        let action = request.action;
        let http = request.to_http(&self.inner.base, &self.inner.token);
        debug!("{} {action}", http.method);
        let pending = self.inner.transport.send(http);
        async move {
            let outcome = async {
                let response = pending.await?;
                unwrap_envelope(parse_body(&response)?)
            }
            .await;
            if let Err(err) = &outcome {
                warn!("{action} failed: {err}");
            }
            outcome
        }
        .boxed_local()
    }

    async fn call_as<D: DeserializeOwned>(&self, request: ApiRequest) -> Result<D, DashboardError> {
        decode(self.call(request).await?)
    }

    pub async fn list_warranties(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<WarrantyRecord>, DashboardError> {
        let rows = self
            .call(ApiRequest::new(Action::ListWarranties).with(filter))
            .await?;
        Ok(normalize_rows(&rows))
    }

    pub async fn update_warranty(&self, patch: &WarrantyPatch) -> Result<Value, DashboardError> {
        self.call(ApiRequest::new(Action::UpdateWarranty).with(patch))
            .await
    }

    pub async fn log_follow_up(&self, entry: &FollowUpLogEntry) -> Result<(), DashboardError> {
        self.call(ApiRequest::new(Action::LogFollowUpAction).with(entry))
            .await
            .map(|_| ())
    }

    pub async fn update_boolean_flags(&self, flags: &BooleanFlags) -> Result<Value, DashboardError> {
        self.call(ApiRequest::new(Action::UpdateBooleanFlags).with(flags))
            .await
    }

    pub async fn update_sku(&self, update: &SkuUpdate) -> Result<(), DashboardError> {
        self.call(ApiRequest::new(Action::UpdateSku).with(update))
            .await
            .map(|_| ())
    }

    pub async fn history(&self, warranty_id: &str) -> Result<Vec<HistoryEntry>, DashboardError> {
        self.call_as(ApiRequest::new(Action::GetHistory).param("warrantyId", warranty_id))
            .await
    }

    pub async fn follow_up_state(&self, warranty_id: &str) -> Result<FollowUpState, DashboardError> {
        self.call_as(ApiRequest::new(Action::GetFollowupState).param("warrantyId", warranty_id))
            .await
    }

    /// Full registration row for one id, `None` when the backend has none.
    pub async fn customer_details(
        &self,
        warranty_id: &str,
    ) -> Result<Option<WarrantyRecord>, DashboardError> {
        let value = self
            .call(ApiRequest::new(Action::GetCustomerDetails).param("warrantyId", warranty_id))
            .await?;
        Ok(normalize_value(&value))
    }

    pub async fn first_followup_kpi(&self) -> Result<BackendKpi, DashboardError> {
        self.call_as(ApiRequest::new(Action::FirstFollowupKpi)).await
    }

    pub async fn todays_followups_kpi(&self) -> Result<BackendKpi, DashboardError> {
        self.call_as(ApiRequest::new(Action::TodaysFollowupsKpi)).await
    }

    pub async fn list_first_followups(&self) -> Result<Vec<WarrantyRecord>, DashboardError> {
        let rows = self.call(ApiRequest::new(Action::ListFirstFollowups)).await?;
        Ok(normalize_rows(&rows))
    }

    pub async fn list_todays_followups(&self) -> Result<Vec<WarrantyRecord>, DashboardError> {
        let rows = self.call(ApiRequest::new(Action::ListTodaysFollowups)).await?;
        Ok(normalize_rows(&rows))
    }

    /// Asks the backend to refresh the 24h "not reviewed yet" markers.
    pub async fn evaluate_nry24(&self) -> Result<(), DashboardError> {
        self.call(ApiRequest::new(Action::Evaluate24Nry))
            .await
            .map(|_| ())
    }

    /// Batched follow-up summaries through the shared cache.
    pub async fn summaries(&self, ids: &[String]) -> Result<SummaryMap, DashboardError> {
        let client = self.clone();
        let fetch = move |missing: Vec<String>| {
            let request = ApiRequest::new(Action::SummaryBatch).param("ids", missing.join(","));
            let pending = client.call(request);
            async move {
                let value = pending.await?;
                decode::<HashMap<String, FollowUpSummary>>(value)
            }
            .boxed_local()
        };
        let clock = Rc::clone(&self.inner.clock);
        self.inner
            .summaries
            .get_batch(ids, move || clock(), fetch)
            .await
    }

    /// Summary for a single id; an unknown id reads as no progress.
    pub async fn summary(&self, warranty_id: &str) -> Result<FollowUpSummary, DashboardError> {
        let mut map = self.summaries(&[warranty_id.to_string()]).await?;
        Ok(map.remove(warranty_id).unwrap_or_default())
    }

    /// Completes a follow-up stage.
    ///
    /// `known` is the latest state the caller has seen. Out-of-order and
    /// post-review requests are refused locally with the error the backend
    /// would return; everything else is sent and the backend decides,
    /// including whether the stage was already done.
    pub async fn complete_stage(
        &self,
        warranty_id: &str,
        stage: Stage,
        remark: &str,
        known: WorkflowState,
        updated_by: &str,
    ) -> Result<StageOutcome, DashboardError> {
        known.check(Transition::CompleteStage(stage))?;
        let request = match stage {
            Stage::One => {
                let mut request = ApiRequest::new(Action::UpdateFollowUpStatus)
                    .param("warrantyId", warranty_id);
                if !remark.trim().is_empty() {
                    request = request.param("followUp1Remark", remark);
                }
                request
            }
            Stage::Two | Stage::Three => ApiRequest::new(Action::MarkFollowUp)
                .param("warrantyId", warranty_id)
                .param("followUpNo", stage.number().to_string())
                .param("remark", remark),
        }
        .param("updatedBy", updated_by);
        let outcome: StageOutcome = self.call_as(request).await?;
        self.inner.summaries.invalidate(&[warranty_id]);
        Ok(outcome)
    }

    /// Marks the review as done and triggers the extended-warranty card.
    pub async fn mark_review_done(
        &self,
        warranty_id: &str,
        remark: &str,
        updated_by: &str,
    ) -> Result<(), DashboardError> {
        let mut request = ApiRequest::new(Action::UpdateReviewAndTriggerCard)
            .param("warrantyId", warranty_id)
            .param("reviewDone", "true")
            .param("extendedWarrantySent", "true");
        if !remark.trim().is_empty() {
            request = request.param("remarks", remark);
        }
        self.call(request.param("updatedBy", updated_by)).await?;
        self.inner.summaries.invalidate(&[warranty_id]);
        Ok(())
    }

    /// Primary email path: the backend's `sendWarrantyEmail` action.
    pub async fn send_warranty_email(
        &self,
        email: &OutgoingEmail,
    ) -> Result<EmailSendResult, DashboardError> {
        let request = ApiRequest::new(Action::SendWarrantyEmail)
            .param("to", email.to.clone())
            .param("subject", email.subject.clone())
            .param("htmlBody", email.html_body.clone())
            .param("fromEmail", email.from_email.clone())
            .param("fromName", email.from_name.clone())
            .param("replyTo", email.reply_to.clone().unwrap_or_default())
            .param("warrantyId", email.customer.warranty_id.clone());
        let value = self.call(request).await?;
        let mut result: EmailSendResult = decode(value).unwrap_or_default();
        result.success = true;
        Ok(result)
    }

    /// Current time according to the client's clock.
    pub fn clock_now(&self) -> DateTime<Utc> {
        self.now()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use crate::gateway::Method;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Returns `Pending` once so concurrent callers interleave.
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    type Responder = Box<dyn Fn(&HttpRequest) -> TransportResponse>;

    pub(crate) struct FakeTransport {
        pub requests: RefCell<Vec<HttpRequest>>,
        respond: Responder,
    }

    impl FakeTransport {
        pub fn new(respond: impl Fn(&HttpRequest) -> TransportResponse + 'static) -> Rc<Self> {
            Rc::new(FakeTransport {
                requests: RefCell::new(Vec::new()),
                respond: Box::new(respond),
            })
        }
    }

    impl Transport for FakeTransport {
        fn send(
            &self,
            request: HttpRequest,
        ) -> LocalBoxFuture<'static, Result<TransportResponse, DashboardError>> {
            let response = (self.respond)(&request);
            self.requests.borrow_mut().push(request);
            async move {
                YieldNow(false).await;
                Ok(response)
            }
            .boxed_local()
        }
    }

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            sheets_api_base: "https://script.google.com/macros/s/x/exec".to_string(),
            sheets_api_token: "tok".to_string(),
            ..Default::default()
        }
    }

    fn summaries_body() -> TransportResponse {
        TransportResponse::ok(
            r#"{"A":{"count":1,"stages":[1],"latest":null,"nextDue":null},
               "B":{"count":2,"stages":[1,2],"latest":null,"nextDue":null}}"#,
        )
    }

    #[test]
    fn cached_ids_are_not_refetched() {
        let transport = FakeTransport::new(|_| summaries_body());
        let client = SheetsClient::new(&config(), Rc::clone(&transport));

        let first = block_on(client.summaries(&["A".to_string()])).unwrap();
        assert_eq!(first["A"].count, 1);

        let both = block_on(client.summaries(&["A".to_string(), "B".to_string()])).unwrap();
        assert_eq!(both["A"].count, 1);
        assert_eq!(both["B"].count, 2);

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].url.ends_with("action=summaryBatch&ids=B"));
    }

    #[test]
    fn concurrent_identical_batches_share_one_request() {
        let transport = FakeTransport::new(|_| summaries_body());
        let client = SheetsClient::new(&config(), Rc::clone(&transport));
        let ids = vec!["B".to_string(), "A".to_string()];
        let reversed = vec!["A".to_string(), "B".to_string()];

        let (left, right) = block_on(async {
            futures::join!(client.summaries(&ids), client.summaries(&reversed))
        });
        assert_eq!(left.unwrap().len(), 2);
        assert_eq!(right.unwrap().len(), 2);
        assert_eq!(transport.requests.borrow().len(), 1);
    }

    #[test]
    fn application_errors_surface_the_backend_message() {
        let transport = FakeTransport::new(|_| {
            TransportResponse::ok(r#"{"success":false,"error":"Invalid token"}"#)
        });
        let client = SheetsClient::new(&config(), transport);
        let err = block_on(client.history("W-1")).unwrap_err();
        assert_eq!(err, DashboardError::Application("Invalid token".to_string()));
        assert!(err.is_application());
    }

    #[test]
    fn list_normalizes_rows() {
        let transport = FakeTransport::new(|_| {
            TransportResponse::ok(
                r#"{"success":true,"data":[{"WarrantyID":"BB-1","Brand":"Baybee"},5]}"#,
            )
        });
        let client = SheetsClient::new(&config(), Rc::clone(&transport));
        let rows = block_on(client.list_warranties(&ListFilter::default())).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].warranty_id, "BB-1");
        assert!(transport.requests.borrow()[0].url.contains("action=listWarranties"));
    }

    #[test]
    fn out_of_order_stage_is_refused_before_sending() {
        let transport = FakeTransport::new(|_| TransportResponse::ok("{}"));
        let client = SheetsClient::new(&config(), Rc::clone(&transport));
        let err = block_on(client.complete_stage(
            "W-1",
            Stage::Three,
            "",
            WorkflowState::FollowUp1Done,
            "Dashboard",
        ))
        .unwrap_err();
        assert_eq!(
            err,
            DashboardError::Workflow(WorkflowError::OutOfOrder { stage: 3, requires: 2 })
        );
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn stage_one_uses_update_follow_up_status() {
        let transport = FakeTransport::new(|_| {
            TransportResponse::ok(r#"{"success":true,"alreadyDone":true,"followupsDone":1}"#)
        });
        let client = SheetsClient::new(&config(), Rc::clone(&transport));
        let outcome = block_on(client.complete_stage(
            "W-1",
            Stage::One,
            "called",
            WorkflowState::Pending,
            "Dashboard",
        ))
        .unwrap();
        assert!(outcome.already_done);
        let body = transport.requests.borrow()[0].body.clone().unwrap_or_default();
        assert!(body.contains("action=updateFollowUpStatus"));
        assert!(body.contains("followUp1Remark=called"));
    }

    #[test]
    fn update_warranty_posts_without_action() {
        use chrono::TimeZone;

        let transport = FakeTransport::new(|_| {
            TransportResponse::ok(r#"{"success":true,"data":{"warrantyId":"W-1"}}"#)
        });
        let client = SheetsClient::new(&config(), Rc::clone(&transport));
        let patch = WarrantyPatch {
            warranty_id: "W-1".to_string(),
            remark: Some("call back".to_string()),
            next_follow_up: Some(Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap()),
            assigned_to: Some("ravi".to_string()),
            updated_by: "a@galaxyinc.in".to_string(),
            ..Default::default()
        };
        let saved = block_on(client.update_warranty(&patch)).unwrap();
        assert_eq!(saved["warrantyId"], "W-1");

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        let body = requests[0].body.clone().unwrap_or_default();
        assert!(body.starts_with("token=tok&warrantyId=W-1"));
        assert!(!body.contains("action="));
        assert!(body.contains("remark=call%20back"));
        assert!(body.contains("nextFollowUp=2024-06-10T09%3A30%3A00%2B00%3A00"));
        assert!(body.contains("assignedTo=ravi"));
        assert!(body.ends_with("updatedBy=a%40galaxyinc.in"));
        assert!(!body.contains("status="));
    }

    #[test]
    fn followup_lists_use_their_actions_and_normalize() {
        let transport = FakeTransport::new(|request| {
            let body = if request.url.contains("action=listFirstFollowups") {
                r#"{"success":true,"data":[{"WarrantyID":"F-1"},{"warrantyId":"F-2"}]}"#
            } else {
                r#"{"success":true,"data":[{"warrantyId":"T-1","feedbackReceived":"FALSE"}]}"#
            };
            TransportResponse::ok(body)
        });
        let client = SheetsClient::new(&config(), Rc::clone(&transport));

        let first = block_on(client.list_first_followups()).unwrap();
        let ids: Vec<&str> = first.iter().map(|row| row.warranty_id.as_str()).collect();
        assert_eq!(ids, ["F-1", "F-2"]);

        let todays = block_on(client.list_todays_followups()).unwrap();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].warranty_id, "T-1");
        assert!(!todays[0].feedback_received);

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|request| request.method == Method::Get));
        assert!(requests[0].url.ends_with("?token=tok&action=listFirstFollowups"));
        assert!(requests[1].url.ends_with("?token=tok&action=listTodaysFollowups"));
    }
}
