//! Typed REST client for the affiliate dashboard backend.
//!
//! The remote operations form a closed set of methods on [`ApiClient`]:
//! mutations (`request_otp`, `verify_otp`, `review_kyc`) always hit the wire,
//! queries (`invoices`, `affiliate_kyc`) cache their last outcome per
//! argument and coalesce concurrent identical calls into one request. Every
//! outbound request carries the stored session's access token when one
//! exists.
//!
//! # Example
//!
//! ```rust,ignore
//! use affiliate_api::{ApiClient, ClientConfig, LoginFlow, OtpOutcome, SessionStore};
//!
//! let config = ClientConfig::from_env()?;
//! let sessions = SessionStore::open(&config.session_file);
//! let client = ApiClient::new(&config, sessions)?;
//!
//! // Two-step login
//! let mut flow = LoginFlow::new(client.clone());
//! flow.submit_phone("9999999999").await;
//! if let OtpOutcome::Authenticated { .. } = flow.submit_otp("123456").await {
//!     // Authenticated calls from here on
//!     let invoices = client.invoices("9999999999").await?;
//! }
//! ```

mod cache;
pub mod config;
pub mod error;
pub mod login;
pub mod session;
pub mod types;

pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use login::{LoginFlow, LoginStep, Notice, NoticeKind, OtpOutcome, PhoneOutcome};
pub use session::{Session, SessionStore};
pub use types::*;

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::QueryCache;

/// Client for the affiliate dashboard REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session store,
/// and the query caches.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    sessions: SessionStore,
    invoices_cache: Arc<QueryCache<Vec<Invoice>>>,
    kyc_cache: Arc<QueryCache<AffiliateKyc>>,
}

impl ApiClient {
    /// Create a client against `config.base_url`, injecting credentials from
    /// `sessions`.
    pub fn new(config: &ClientConfig, sessions: SessionStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sessions,
            invoices_cache: Arc::new(QueryCache::new()),
            kyc_cache: Arc::new(QueryCache::new()),
        })
    }

    /// Session store this client reads tokens from.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Ask the backend to send a login OTP to `mobile`.
    ///
    /// Mutation; never cached.
    pub async fn request_otp(&self, mobile: &str) -> Result<Envelope<()>> {
        let req = self
            .request(Method::POST, "login")
            .await
            .json(&types::LoginRequest { mobile });
        let response = self.send(req).await?;
        decode_envelope(response).await
    }

    /// Verify the OTP and return the issued credentials.
    ///
    /// Mutation. The caller decides where the session lands; [`LoginFlow`]
    /// persists it through this client's store.
    pub async fn verify_otp(&self, mobile: &str, otp: &str) -> Result<Envelope<LoginResult>> {
        let req = self
            .request(Method::POST, "login/verify-otp")
            .await
            .json(&types::VerifyOtpRequest { mobile, otp });
        let response = self.send(req).await?;
        decode_envelope(response).await
    }

    /// Invoices for `mobile`, in the order the backend serves them.
    ///
    /// Query; cached per mobile number, concurrent identical calls share one
    /// request.
    pub async fn invoices(&self, mobile: &str) -> Result<Vec<Invoice>> {
        let path = format!("dashboard/{mobile}/invoices");
        self.invoices_cache
            .get_or_fetch(mobile, || async {
                let req = self.request(Method::GET, &path).await;
                let response = self.send(req).await?;
                let invoices: Vec<Invoice> = response
                    .json()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                debug!(mobile, count = invoices.len(), "fetched invoices");
                Ok(invoices)
            })
            .await
    }

    /// Drop the cached invoice listing for `mobile` and fetch it again.
    pub async fn refresh_invoices(&self, mobile: &str) -> Result<Vec<Invoice>> {
        self.invoices_cache.invalidate(mobile).await;
        self.invoices(mobile).await
    }

    /// Download an invoice document.
    ///
    /// The body is an opaque binary payload returned exactly as received;
    /// never cached, never run through the JSON decoder.
    pub async fn download_invoice(&self, invoice_id: &str) -> Result<Bytes> {
        let path = format!("invoice/{invoice_id}/download");
        let req = self.request(Method::GET, &path).await;
        let response = self.send(req).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(invoice_id, size = bytes.len(), "downloaded invoice");
        Ok(bytes)
    }

    /// KYC record for an affiliate, for the admin review screen.
    ///
    /// Query; cached per affiliate.
    pub async fn affiliate_kyc(&self, affiliate_id: &str) -> Result<AffiliateKyc> {
        let path = format!("admin/affiliate/{affiliate_id}/kyc");
        self.kyc_cache
            .get_or_fetch(affiliate_id, || async {
                let req = self.request(Method::GET, &path).await;
                let response = self.send(req).await?;
                let envelope: Envelope<AffiliateKyc> = decode_envelope(response).await?;
                envelope
                    .result
                    .ok_or_else(|| ApiError::Decode("KYC reply missing result".into()))
            })
            .await
    }

    /// Approve or reject an affiliate's KYC submission.
    ///
    /// Mutation; drops the cached KYC entry so the next read refetches.
    pub async fn review_kyc(&self, affiliate_id: &str, approve: bool) -> Result<Envelope<()>> {
        let path = format!("admin/affiliate/{affiliate_id}/kyc/review");
        let req = self
            .request(Method::POST, &path)
            .await
            .json(&types::KycReviewRequest { approved: approve });
        let response = self.send(req).await?;
        let envelope = decode_envelope(response).await?;
        self.kyc_cache.invalidate(affiliate_id).await;
        debug!(affiliate_id, approve, "KYC review submitted");
        Ok(envelope)
    }

    /// Build a request for `path`, attaching the current access token when a
    /// session is present. Without one the request goes out unauthenticated;
    /// rejecting it is the server's call.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut req = self.http.request(method, url);
        if let Some(token) = self.sessions.access_token().await {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = req.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(status = %status, message = %message, "server error");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

/// Decode a 2xx response into the business envelope, mapping application-level
/// rejection to [`ApiError::Rejected`].
async fn decode_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    if !envelope.is_success() {
        let message = if envelope.msg.is_empty() {
            "request rejected".to_string()
        } else {
            envelope.msg
        };
        return Err(ApiError::Rejected {
            status: envelope.status,
            message,
        });
    }
    Ok(envelope)
}

/// Best error message available for a non-2xx reply: the envelope's `msg`, a
/// bare `message` field, or the canonical status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}
