//! The pay-and-retry client.
//!
//! [`PayingClient`] turns a bare request into a possibly-paid request
//! transparently: it sends the request, and if the server answers with
//! `402 Payment Required` it parses the challenge, pays it through the
//! configured [`PaymentExecutor`], and retries the request exactly once
//! with the payment proof attached.
//!
//! Per call there is at most one payment submission and at most one
//! retried send; proofs are never cached or reused across calls.

use base64::prelude::*;
use http::StatusCode;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, trace};

use nodo_x402::amount::MoneyAmount;
use nodo_x402::error::ChallengeError;
use nodo_x402::executor::PaymentExecutor;
use nodo_x402::proto::{
    PAYMENT_REQUIRED_HEADER, PaymentChallenge, PaymentProof, X_PAYMENT_TX_HEADER,
    X_REQUEST_ID_HEADER,
};

use crate::error::ClientError;
use crate::hooks::{ClientHooks, PaymentContext, PaymentOutcome};
use crate::types::{RequestSpec, ResponseMeta, ResponseResult};

/// Progress of a single call through the pay-and-retry pipeline.
///
/// Transitions: `Start → Sent → Done` for free responses, and
/// `Start → Sent → Paying → Retried → Done` when payment is demanded.
/// The `Failed` terminal state of the pipeline is the `Err` arm of
/// [`PayingClient::request`]. There is no transition from `Retried` back
/// to `Paying`: a second 402 is terminal, so a call never pays twice.
enum CallState {
    Start,
    Sent {
        response: Response,
    },
    Paying {
        challenge: PaymentChallenge,
    },
    Retried {
        challenge: PaymentChallenge,
        proof: PaymentProof,
        response: Response,
    },
    Done {
        result: ResponseResult,
    },
}

/// HTTP client that transparently satisfies 402 payment demands.
///
/// Generic over the [`PaymentExecutor`] capability so the payment rail is
/// pluggable and tests can substitute a mock. The client holds no per-call
/// state; a `PayingClient` can serve concurrent calls as long as the
/// executor can.
///
/// # Example
///
/// ```ignore
/// use nodo_x402_http::{PayingClient, RequestSpec};
///
/// let client = PayingClient::new("https://api.nodo.ai".parse()?, executor);
/// let result = client
///     .request(&RequestSpec::new("/analyze").with_param("market", market).with_tier("quick"))
///     .await?;
/// println!("{} ({})", result.payload["consensus"], result.meta.cost.unwrap_or_default());
/// ```
pub struct PayingClient<E> {
    http: Client,
    base_url: Url,
    executor: E,
    hooks: ClientHooks,
    max_amount: Option<Decimal>,
}

impl<E> std::fmt::Debug for PayingClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayingClient")
            .field("base_url", &self.base_url.as_str())
            .field("hooks", &self.hooks)
            .field("max_amount", &self.max_amount)
            .finish_non_exhaustive()
    }
}

impl<E> PayingClient<E> {
    /// Creates a client for the given API base URL and payment executor.
    pub fn new(base_url: Url, executor: E) -> Self {
        Self {
            http: Client::new(),
            base_url,
            executor,
            hooks: ClientHooks::default(),
            max_amount: None,
        }
    }

    /// Replaces the underlying `reqwest` client.
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Sets a spend cap in the asset's display unit.
    ///
    /// Challenges demanding more than the cap are declined before the
    /// executor is invoked; the call fails with
    /// [`ClientError::PaymentAborted`].
    #[must_use]
    pub const fn with_max_amount(mut self, cap: Decimal) -> Self {
        self.max_amount = Some(cap);
        self
    }

    /// Installs lifecycle hooks for the payment pipeline.
    #[must_use]
    pub fn with_hooks(mut self, hooks: ClientHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

impl<E> PayingClient<E>
where
    E: PaymentExecutor,
{
    /// Issues the request, paying a 402 challenge if one is presented.
    ///
    /// Exactly zero or one payment submission and zero or one retried send
    /// happen per call. Dropping the returned future before the payment
    /// step initiates no payment; failures after the payment step carry
    /// the proof (see [`ClientError::payment_proof`]).
    ///
    /// # Errors
    ///
    /// See [`ClientError`] for the full taxonomy. None of the failures are
    /// recovered internally: the single pay-and-resend is the only
    /// automatic retry this client performs.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "nodo.x402.request",
            skip_all,
            fields(endpoint = %spec.endpoint()),
            err
        )
    )]
    pub async fn request(&self, spec: &RequestSpec) -> Result<ResponseResult, ClientError> {
        let mut state = CallState::Start;
        loop {
            state = match state {
                CallState::Start => CallState::Sent {
                    response: self.send(spec, None).await?,
                },
                CallState::Sent { response } => {
                    if response.status() == StatusCode::PAYMENT_REQUIRED {
                        #[cfg(feature = "telemetry")]
                        info!("Received 402 Payment Required, negotiating payment");
                        CallState::Paying {
                            challenge: Self::parse_challenge(response).await?,
                        }
                    } else if response.status().is_success() {
                        CallState::Done {
                            result: Self::decode(response, None).await?,
                        }
                    } else {
                        return Err(Self::request_failed(response, None).await);
                    }
                }
                CallState::Paying { challenge } => {
                    self.authorize(&challenge).await?;
                    let proof = self
                        .executor
                        .pay(&challenge)
                        .await
                        .map_err(ClientError::PaymentFailed)?;
                    self.notify_paid(&challenge, &proof).await;
                    #[cfg(feature = "telemetry")]
                    trace!(txid = %proof, "Retrying request with payment proof");
                    let response = self.send(spec, Some(&proof)).await?;
                    CallState::Retried {
                        challenge,
                        proof,
                        response,
                    }
                }
                CallState::Retried {
                    challenge,
                    proof,
                    response,
                } => {
                    if response.status() == StatusCode::PAYMENT_REQUIRED {
                        return Err(ClientError::PaymentRejected { proof });
                    } else if response.status().is_success() {
                        CallState::Done {
                            result: Self::decode(response, Some((&challenge, &proof))).await?,
                        }
                    } else {
                        return Err(Self::request_failed(response, Some(proof)).await);
                    }
                }
                CallState::Done { result } => return Ok(result),
            };
        }
    }

    /// Applies the spend cap and before-payment hooks; first abort wins.
    async fn authorize(&self, challenge: &PaymentChallenge) -> Result<(), ClientError> {
        if let Some(cap) = self.max_amount {
            if challenge.amount > cap {
                return Err(ClientError::PaymentAborted {
                    reason: format!(
                        "challenge amount {} exceeds spend cap {}",
                        challenge.money(),
                        MoneyAmount::new(cap, challenge.asset.clone()),
                    ),
                });
            }
        }
        for hook in &self.hooks.before_payment {
            let ctx = PaymentContext {
                challenge: challenge.clone(),
            };
            if let Some(abort) = hook(ctx).await {
                return Err(ClientError::PaymentAborted {
                    reason: abort.reason,
                });
            }
        }
        Ok(())
    }

    /// Runs after-payment hooks; their results do not affect the call.
    async fn notify_paid(&self, challenge: &PaymentChallenge, proof: &PaymentProof) {
        for hook in &self.hooks.after_payment {
            let outcome = PaymentOutcome {
                challenge: challenge.clone(),
                proof: proof.clone(),
            };
            hook(outcome).await;
        }
    }

    /// Sends the request, attaching the payment proof header when present.
    async fn send(
        &self,
        spec: &RequestSpec,
        proof: Option<&PaymentProof>,
    ) -> Result<Response, ClientError> {
        let url = self
            .base_url
            .join(spec.endpoint())
            .map_err(|source| ClientError::Endpoint {
                endpoint: spec.endpoint().to_owned(),
                source,
            })?;
        let mut request = self.http.post(url).json(&spec.body());
        if let Some(proof) = proof {
            request = request.header(X_PAYMENT_TX_HEADER, &proof.txid);
        }
        request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                source,
                proof: proof.cloned(),
            })
    }

    /// Parses a 402 response into a challenge.
    ///
    /// The `Payment-Required` header (base64-encoded JSON) takes precedence;
    /// servers that omit it carry the challenge as the JSON response body.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "nodo.x402.parse_challenge", skip_all, err)
    )]
    async fn parse_challenge(response: Response) -> Result<PaymentChallenge, ClientError> {
        if let Some(value) = response.headers().get(PAYMENT_REQUIRED_HEADER).cloned() {
            #[cfg(feature = "telemetry")]
            debug!("Parsing challenge from Payment-Required header");
            let bytes = BASE64_STANDARD.decode(value.as_bytes()).map_err(|e| {
                ClientError::MalformedChallenge(ChallengeError::Encoding(e.to_string()))
            })?;
            return PaymentChallenge::parse(&bytes).map_err(ClientError::MalformedChallenge);
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                source,
                proof: None,
            })?;
        PaymentChallenge::parse(&body).map_err(ClientError::MalformedChallenge)
    }

    /// Decodes a success response into the final result.
    async fn decode(
        response: Response,
        paid: Option<(&PaymentChallenge, &PaymentProof)>,
    ) -> Result<ResponseResult, ClientError> {
        let request_id_header = response
            .headers()
            .get(X_REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let err_proof = paid.map(|(_, proof)| proof.clone());
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                source,
                proof: err_proof.clone(),
            })?;
        let payload: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                source,
                proof: err_proof,
            })?
        };
        Ok(Self::build_result(payload, request_id_header, paid))
    }

    /// Assembles response metadata, deriving anything the server omitted
    /// from the payment negotiation.
    fn build_result(
        payload: Value,
        request_id_header: Option<String>,
        paid: Option<(&PaymentChallenge, &PaymentProof)>,
    ) -> ResponseResult {
        let mut meta = payload
            .get("meta")
            .and_then(|m| serde_json::from_value::<ResponseMeta>(m.clone()).ok())
            .unwrap_or_default();
        if meta.cost.is_none() {
            meta.cost = paid.map(|(challenge, _)| challenge.money().to_string());
        }
        if meta.request_id.is_none() {
            meta.request_id = request_id_header.or_else(|| {
                paid.map(|(challenge, _)| {
                    challenge
                        .request_id
                        .clone()
                        .unwrap_or_else(|| challenge.memo.clone())
                })
            });
        }
        if meta.payment.is_none() {
            meta.payment = paid.map(|(_, proof)| proof.txid.clone());
        }
        ResponseResult { payload, meta }
    }

    /// Builds the terminal error for a non-success, non-402 response.
    async fn request_failed(response: Response, proof: Option<PaymentProof>) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::RequestFailed {
            status,
            body,
            proof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::AbortPayment;
    use async_trait::async_trait;
    use nodo_x402::error::ExecutorError;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Executor that returns sequential proofs (`T1`, `T2`, ...) and records
    /// the challenges it was asked to pay.
    #[derive(Default)]
    struct MockExecutor {
        calls: AtomicUsize,
        fail: bool,
        challenges: Mutex<Vec<PaymentChallenge>>,
    }

    impl MockExecutor {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentExecutor for MockExecutor {
        async fn pay(&self, challenge: &PaymentChallenge) -> Result<PaymentProof, ExecutorError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.challenges.lock().unwrap().push(challenge.clone());
            if self.fail {
                return Err(ExecutorError::Submission("insufficient funds".into()));
            }
            Ok(PaymentProof::new(format!("T{n}"), challenge.memo.clone()))
        }
    }

    fn challenge_body(memo: &str) -> serde_json::Value {
        serde_json::json!({
            "amount": "0.01",
            "asset": "USDC",
            "recipient": "7aD4sFaiytMLpMUyVcMu6AeQrrTyYY3jNFB27PHifGnU",
            "network": "solana",
            "memo": memo,
        })
    }

    fn analyze_spec() -> RequestSpec {
        RequestSpec::new("/analyze")
            .with_param("market", "polymarket.com/event/btc-150k-2025")
            .with_tier("quick")
    }

    fn client_for(server: &MockServer, executor: Arc<MockExecutor>) -> PayingClient<Arc<MockExecutor>> {
        PayingClient::new(server.uri().parse().unwrap(), executor)
    }

    #[tokio::test]
    async fn test_success_without_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Request-Id", "req_42")
                    .set_body_json(serde_json::json!({ "consensus": "yes", "confidence": 87 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let result = client.request(&analyze_spec()).await.unwrap();

        assert_eq!(result.payload["consensus"], "yes");
        assert_eq!(result.meta.request_id.as_deref(), Some("req_42"));
        assert!(result.meta.cost.is_none());
        assert!(result.meta.payment.is_none());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pays_once_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("X-Payment-Tx", "T1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "consensus": "yes", "confidence": 87 })),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_partial_json(serde_json::json!({ "tier": "quick" })))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let result = client.request(&analyze_spec()).await.unwrap();

        assert_eq!(result.payload["confidence"], 87);
        assert_eq!(result.meta.cost.as_deref(), Some("0.01 USDC"));
        assert_eq!(result.meta.request_id.as_deref(), Some("nodo:req_1"));
        assert_eq!(result.meta.payment.as_deref(), Some("T1"));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_second_402_is_rejected_without_second_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(2)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        match err {
            ClientError::PaymentRejected { ref proof } => assert_eq!(proof.txid, "T1"),
            other => panic!("expected PaymentRejected, got {other:?}"),
        }
        assert!(err.funds_at_risk());
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_amount_is_malformed_before_executor() {
        let server = MockServer::start().await;
        let mut body = challenge_body("nodo:req_1");
        body.as_object_mut().unwrap().remove("amount");
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        assert!(matches!(err, ClientError::MalformedChallenge(_)));
        assert!(!err.funds_at_risk());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_use_fresh_proofs() {
        let server = MockServer::start().await;
        for txid in ["T1", "T2"] {
            Mock::given(method("POST"))
                .and(path("/analyze"))
                .and(header("X-Payment-Tx", txid))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
                )
                .with_priority(1)
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(2)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let first = client.request(&analyze_spec()).await.unwrap();
        let second = client.request(&analyze_spec()).await.unwrap();

        assert_eq!(first.meta.payment.as_deref(), Some("T1"));
        assert_eq!(second.meta.payment.as_deref(), Some("T2"));
        assert_eq!(executor.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_402_error_skips_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        match err {
            ClientError::RequestFailed {
                status,
                ref body,
                ref proof,
            } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
                assert!(proof.is_none());
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_error_after_payment_carries_proof() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("X-Payment-Tx", "T1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("settlement lag"))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        assert!(err.funds_at_risk());
        assert_eq!(err.payment_proof().map(|p| p.txid.as_str()), Some("T1"));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_spend_cap_aborts_before_executor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client =
            client_for(&server, Arc::clone(&executor)).with_max_amount(Decimal::new(1, 3));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        assert!(matches!(err, ClientError::PaymentAborted { .. }));
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_executor_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::failing());
        let client = client_for(&server, Arc::clone(&executor));
        let err = client.request(&analyze_spec()).await.unwrap_err();

        assert!(matches!(err, ClientError::PaymentFailed(_)));
        assert!(!err.funds_at_risk());
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_challenge_from_payment_required_header() {
        let server = MockServer::start().await;
        let encoded =
            BASE64_STANDARD.encode(serde_json::to_vec(&challenge_body("nodo:req_9")).unwrap());
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("X-Payment-Tx", "T1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(
                ResponseTemplate::new(402)
                    .insert_header("Payment-Required", encoded.as_str())
                    .set_body_string(""),
            )
            .expect(1)
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let result = client.request(&analyze_spec()).await.unwrap();

        assert_eq!(result.meta.request_id.as_deref(), Some("nodo:req_9"));
        assert_eq!(executor.call_count(), 1);
        let challenges = executor.challenges.lock().unwrap();
        assert_eq!(challenges[0].memo, "nodo:req_9");
    }

    #[tokio::test]
    async fn test_before_hook_abort_prevents_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .expect(1)
            .mount(&server)
            .await;

        let hooks = ClientHooks::new().on_before_payment(|_ctx| {
            Box::pin(async move { Some(AbortPayment::new("manual approval required")) })
        });
        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor)).with_hooks(hooks);
        let err = client.request(&analyze_spec()).await.unwrap_err();

        match err {
            ClientError::PaymentAborted { ref reason } => {
                assert_eq!(reason, "manual approval required");
            }
            other => panic!("expected PaymentAborted, got {other:?}"),
        }
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_after_hook_observes_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("X-Payment-Tx", "T1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(402).set_body_json(challenge_body("nodo:req_1")))
            .mount(&server)
            .await;

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = ClientHooks::new().on_after_payment(move |outcome| {
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                sink.lock().unwrap().push(outcome.proof.txid);
            })
        });

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor)).with_hooks(hooks);
        client.request(&analyze_spec()).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), ["T1".to_owned()]);
    }

    #[tokio::test]
    async fn test_body_meta_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": 1,
                "meta": { "cost": "0.00 USDC", "requestId": "req_7" }
            })))
            .mount(&server)
            .await;

        let executor = Arc::new(MockExecutor::default());
        let client = client_for(&server, Arc::clone(&executor));
        let result = client.request(&analyze_spec()).await.unwrap();

        assert_eq!(result.meta.cost.as_deref(), Some("0.00 USDC"));
        assert_eq!(result.meta.request_id.as_deref(), Some("req_7"));
    }
}
