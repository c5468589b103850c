//! Request and response types for the paying client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Specification of one API call.
///
/// Immutable once constructed; each [`request`](crate::PayingClient::request)
/// call takes its own spec. The endpoint is joined against the client's
/// base URL, and the parameters become the JSON request body.
///
/// # Example
///
/// ```rust
/// use nodo_x402_http::RequestSpec;
///
/// let spec = RequestSpec::new("/analyze")
///     .with_param("market", "polymarket.com/event/btc-150k-2025")
///     .with_tier("quick");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    endpoint: String,
    params: Map<String, Value>,
    tier: Option<String>,
}

impl RequestSpec {
    /// Creates a spec for the given endpoint route.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Map::new(),
            tier: None,
        }
    }

    /// Adds a named parameter to the request body.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the tier/cost hint for the request.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Returns the endpoint route.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the tier hint, if set.
    #[must_use]
    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    /// Builds the JSON request body from the parameters and tier hint.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = self.params.clone();
        if let Some(tier) = &self.tier {
            body.insert("tier".to_owned(), Value::String(tier.clone()));
        }
        Value::Object(body)
    }
}

/// Metadata accompanying a decoded response.
///
/// Fields the server includes in the response body's `meta` object are
/// passed through; anything missing is derived from the payment
/// negotiation (cost from the paid challenge, request id from the
/// `X-Request-Id` header or the challenge).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMeta {
    /// Cost actually paid, as a money string (e.g. `"0.01 USDC"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,

    /// Opaque request identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Transaction signature of the payment that unlocked this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

/// The final outcome of a paid (or free) request.
///
/// The payload is the full response body, passed through undecoded beyond
/// JSON; domain fields are not interpreted by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseResult {
    /// Decoded response body.
    pub payload: Value,

    /// Cost, request id, and payment reference for this call.
    pub meta: ResponseMeta,
}
