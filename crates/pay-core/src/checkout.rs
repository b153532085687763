//! # Checkout Session Initiator
//!
//! Drives the Buy flow: ask the session-creation endpoint for a checkout
//! session, then hand the session id to the payment provider's client so
//! the browser lands on the hosted checkout page.
//!
//! ```text
//!   Idle ──buy──▶ Creating ──id──▶ redirect ──ok──▶ Redirected
//!                    │                 │
//!                    └──err──┐   ┌─err─┘
//!                            ▼   ▼
//!                     Idle (error surfaced)
//! ```
//!
//! Both collaborators are explicit capabilities handed to
//! [`CheckoutInitiator::new`]; the initiator itself only tracks whether a
//! session is currently being created.

use crate::error::{PaymentError, PaymentResult};
use crate::item::Item;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};

/// Body posted to the session-creation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub item: Item,
}

/// Body returned by the session-creation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    /// Provider checkout session id
    pub id: String,
}

/// The server-side endpoint that creates checkout sessions.
#[async_trait(?Send)]
pub trait SessionEndpoint {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> PaymentResult<CheckoutSessionResponse>;
}

/// Client-side handle on the payment provider.
///
/// Constructed once from the publishable key when the page starts and
/// passed to the initiator.
#[async_trait(?Send)]
pub trait PaymentClient {
    /// Send the browser to the hosted checkout page for `session_id`.
    ///
    /// Returns `PaymentError::RedirectFailed` carrying the provider's
    /// message when the provider refuses (invalid or expired session,
    /// bad publishable key).
    async fn redirect_to_checkout(&self, session_id: &str) -> PaymentResult<()>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// How a Buy attempt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// The provider accepted the session and is navigating away
    Redirected,
    /// The session-creation endpoint failed (network, non-2xx, bad body)
    EndpointError(String),
    /// The provider refused to redirect
    RedirectError(String),
}

impl CheckoutOutcome {
    /// Message to show the user, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CheckoutOutcome::Redirected => None,
            CheckoutOutcome::EndpointError(msg) | CheckoutOutcome::RedirectError(msg) => {
                Some(msg)
            }
        }
    }
}

/// Runs one checkout at a time for a page.
pub struct CheckoutInitiator<E, P> {
    endpoint: E,
    payments: P,
    creating: Rc<Cell<bool>>,
}

impl<E, P> CheckoutInitiator<E, P>
where
    E: SessionEndpoint,
    P: PaymentClient,
{
    pub fn new(endpoint: E, payments: P) -> Self {
        Self {
            endpoint,
            payments,
            creating: Rc::new(Cell::new(false)),
        }
    }

    /// True while a session is being created
    pub fn is_creating(&self) -> bool {
        self.creating.get()
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn payments(&self) -> &P {
        &self.payments
    }

    /// Create a checkout session for `item` and redirect to it.
    ///
    /// Fails fast with `CheckoutInFlight` if another call is still running
    /// and with `InvalidRequest` if the quantity is 0. Every other failure is
    /// reported through the returned [`CheckoutOutcome`].
    pub async fn create_checkout_session(&self, item: &Item) -> PaymentResult<CheckoutOutcome> {
        let busy = self.begin(item)?;
        Ok(self.complete(busy, item).await)
    }

    /// Claim the busy flag for a checkout of `item` without awaiting.
    ///
    /// `is_creating()` is true as soon as this returns `Ok` and stays true
    /// until the returned flag is dropped.
    pub fn begin(&self, item: &Item) -> PaymentResult<BusyFlag> {
        if self.creating.get() {
            warn!("Checkout already in flight, ignoring request");
            return Err(PaymentError::CheckoutInFlight);
        }
        if item.quantity == 0 {
            return Err(PaymentError::InvalidRequest(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(BusyFlag::raise(Rc::clone(&self.creating)))
    }

    /// Run the create-then-redirect chain for a checkout claimed by [`begin`].
    ///
    /// [`begin`]: CheckoutInitiator::begin
    #[instrument(skip(self, busy, item), fields(quantity = item.quantity, price = item.price))]
    pub async fn complete(&self, busy: BusyFlag, item: &Item) -> CheckoutOutcome {
        let _busy = busy;

        let request = CheckoutSessionRequest { item: item.clone() };
        let session = match self.endpoint.create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to create checkout session: {}", e);
                return CheckoutOutcome::EndpointError(e.to_string());
            }
        };

        debug!(
            "Redirecting to {} checkout: session={}",
            self.payments.provider_name(),
            session.id
        );

        match self.payments.redirect_to_checkout(&session.id).await {
            Ok(()) => {
                info!("Redirected to hosted checkout: session={}", session.id);
                CheckoutOutcome::Redirected
            }
            Err(PaymentError::RedirectFailed(message)) => {
                error!("Redirect refused by provider: {}", message);
                CheckoutOutcome::RedirectError(message)
            }
            Err(e) => {
                error!("Redirect failed: {}", e);
                CheckoutOutcome::RedirectError(e.to_string())
            }
        }
    }
}

/// Holds the in-flight flag up until dropped, so it also clears when the
/// future is dropped mid-flight.
#[derive(Debug)]
pub struct BusyFlag(Rc<Cell<bool>>);

impl BusyFlag {
    fn raise(flag: Rc<Cell<bool>>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for BusyFlag {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ItemForm;
    use std::cell::RefCell;
    use tokio::sync::Notify;

    /// Endpoint that records every request and answers with a fixed result
    struct RecordingEndpoint {
        requests: RefCell<Vec<serde_json::Value>>,
        reply: Result<String, u16>,
    }

    impl RecordingEndpoint {
        fn ok(id: &str) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                reply: Ok(id.to_string()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                reply: Err(status),
            }
        }
    }

    #[async_trait(?Send)]
    impl SessionEndpoint for RecordingEndpoint {
        async fn create_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> PaymentResult<CheckoutSessionResponse> {
            self.requests
                .borrow_mut()
                .push(serde_json::to_value(request).unwrap());
            match &self.reply {
                Ok(id) => Ok(CheckoutSessionResponse { id: id.clone() }),
                Err(status) => Err(PaymentError::EndpointStatus {
                    status: *status,
                    message: "Internal Server Error".to_string(),
                }),
            }
        }
    }

    /// Payment client that records redirect calls
    struct RecordingClient {
        redirects: RefCell<Vec<String>>,
        error: Option<String>,
    }

    impl RecordingClient {
        fn ok() -> Self {
            Self {
                redirects: RefCell::new(Vec::new()),
                error: None,
            }
        }

        fn refusing(message: &str) -> Self {
            Self {
                redirects: RefCell::new(Vec::new()),
                error: Some(message.to_string()),
            }
        }
    }

    #[async_trait(?Send)]
    impl PaymentClient for RecordingClient {
        async fn redirect_to_checkout(&self, session_id: &str) -> PaymentResult<()> {
            self.redirects.borrow_mut().push(session_id.to_string());
            match &self.error {
                Some(message) => Err(PaymentError::RedirectFailed(message.clone())),
                None => Ok(()),
            }
        }

        fn provider_name(&self) -> &'static str {
            "test"
        }
    }

    /// Endpoint that parks until released
    #[derive(Default)]
    struct GatedEndpoint {
        entered: Notify,
        release: Notify,
    }

    #[async_trait(?Send)]
    impl SessionEndpoint for GatedEndpoint {
        async fn create_session(
            &self,
            _request: &CheckoutSessionRequest,
        ) -> PaymentResult<CheckoutSessionResponse> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(CheckoutSessionResponse {
                id: "sess_gated".to_string(),
            })
        }
    }

    fn form_with_three() -> ItemForm {
        let mut form = ItemForm::default();
        form.set_quantity(1);
        form.increment();
        form.increment();
        form
    }

    #[tokio::test]
    async fn test_successful_checkout_redirects_once() {
        let form = form_with_three();
        assert_eq!(form.total().amount, 2997);

        let initiator =
            CheckoutInitiator::new(RecordingEndpoint::ok("sess_123"), RecordingClient::ok());
        let outcome = initiator
            .create_checkout_session(form.item())
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Redirected);
        assert!(!initiator.is_creating());

        let requests = initiator.endpoint().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["item"]["quantity"], 3);
        assert_eq!(requests[0]["item"]["price"], 999);
        assert_eq!(requests[0]["item"]["name"], "Apple AirPods");

        assert_eq!(
            *initiator.payments().redirects.borrow(),
            vec!["sess_123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_endpoint_failure_skips_redirect() {
        let form = form_with_three();
        let initiator =
            CheckoutInitiator::new(RecordingEndpoint::failing(500), RecordingClient::ok());

        let outcome = initiator
            .create_checkout_session(form.item())
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::EndpointError(_)));
        assert!(outcome.message().unwrap().contains("500"));
        assert!(!initiator.is_creating());
        assert!(form.buy_enabled(initiator.is_creating()));
        assert!(initiator.payments().redirects.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_error_message_is_surfaced() {
        let form = form_with_three();
        let initiator = CheckoutInitiator::new(
            RecordingEndpoint::ok("sess_old"),
            RecordingClient::refusing("Session expired"),
        );

        let outcome = initiator
            .create_checkout_session(form.item())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::RedirectError("Session expired".to_string())
        );
        assert_eq!(outcome.message(), Some("Session expired"));
        assert!(!initiator.is_creating());
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_without_request() {
        let form = ItemForm::default();
        let initiator =
            CheckoutInitiator::new(RecordingEndpoint::ok("sess_123"), RecordingClient::ok());

        let result = initiator.create_checkout_session(form.item()).await;

        assert!(matches!(result, Err(PaymentError::InvalidRequest(_))));
        assert!(initiator.endpoint().requests.borrow().is_empty());
        assert!(!initiator.is_creating());
    }

    #[tokio::test]
    async fn test_second_buy_while_in_flight_is_rejected() {
        let form = form_with_three();
        let initiator = CheckoutInitiator::new(GatedEndpoint::default(), RecordingClient::ok());

        let (first, ()) = tokio::join!(initiator.create_checkout_session(form.item()), async {
            initiator.endpoint().entered.notified().await;
            assert!(initiator.is_creating());
            assert!(!form.buy_enabled(initiator.is_creating()));
            assert_eq!(form.buy_label(initiator.is_creating()), "Processing...");

            let second = initiator.create_checkout_session(form.item()).await;
            assert!(matches!(second, Err(PaymentError::CheckoutInFlight)));

            initiator.endpoint().release.notify_one();
        });

        assert_eq!(first.unwrap(), CheckoutOutcome::Redirected);
        assert!(!initiator.is_creating());
        assert_eq!(initiator.payments().redirects.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let form = form_with_three();
        let initiator = CheckoutInitiator::new(
            RecordingEndpoint::ok("sess_1"),
            RecordingClient::refusing("Session expired"),
        );

        for _ in 0..2 {
            let outcome = initiator
                .create_checkout_session(form.item())
                .await
                .unwrap();
            assert!(matches!(outcome, CheckoutOutcome::RedirectError(_)));
        }
        assert_eq!(initiator.endpoint().requests.borrow().len(), 2);
    }

    #[test]
    fn test_busy_flag_clears_on_drop() {
        let flag = Rc::new(Cell::new(false));
        {
            let _busy = BusyFlag::raise(Rc::clone(&flag));
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_begin_marks_busy_before_any_await() {
        let form = form_with_three();
        let initiator =
            CheckoutInitiator::new(RecordingEndpoint::ok("sess_123"), RecordingClient::ok());

        let busy = initiator.begin(form.item()).unwrap();
        assert!(initiator.is_creating());
        assert!(!form.buy_enabled(initiator.is_creating()));
        assert_eq!(form.buy_label(initiator.is_creating()), "Processing...");
        assert!(matches!(
            initiator.begin(form.item()),
            Err(PaymentError::CheckoutInFlight)
        ));
        assert!(initiator.endpoint().requests.borrow().is_empty());

        drop(busy);
        assert!(!initiator.is_creating());
    }

    #[tokio::test]
    async fn test_begin_then_complete_redirects() {
        let form = form_with_three();
        let initiator =
            CheckoutInitiator::new(RecordingEndpoint::ok("sess_123"), RecordingClient::ok());

        let busy = initiator.begin(form.item()).unwrap();
        let outcome = initiator.complete(busy, form.item()).await;

        assert_eq!(outcome, CheckoutOutcome::Redirected);
        assert!(!initiator.is_creating());
        assert_eq!(
            *initiator.payments().redirects.borrow(),
            vec!["sess_123".to_string()]
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(CheckoutOutcome::RedirectError("nope".into())).unwrap();
        assert_eq!(json["kind"], "redirect_error");
        assert_eq!(json["message"], "nope");

        let json = serde_json::to_value(CheckoutOutcome::Redirected).unwrap();
        assert_eq!(json["kind"], "redirected");
    }
}
