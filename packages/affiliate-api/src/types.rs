//! Wire types for the affiliate dashboard API.

use serde::{Deserialize, Serialize};

/// Business envelope wrapped around the JSON endpoints.
///
/// Transport success and application success are separate: the HTTP call can
/// return 2xx while `status`/`success` report a rejection. A call only counts
/// as accepted when `status == 200` and `success` is true.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: u16,
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// Application-level accept/reject flag.
    pub fn is_success(&self) -> bool {
        self.status == 200 && self.success
    }
}

/// Credentials and user record issued on successful OTP verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Opaque user record; stored verbatim, never interpreted client-side.
    pub user: serde_json::Value,
}

/// One row of the dashboard invoice listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub date: String,
    pub amount: String,
    pub status: String,
    #[serde(default)]
    pub reference_number: Option<String>,
}

/// Review state of an affiliate's KYC submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

/// Identity and bank details captured during affiliate KYC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDetails {
    pub id_type: String,
    pub id_value: String,
    pub id_document: String,
    pub account_number: String,
    pub ifsc: String,
    pub account_name: String,
    pub bank_name: String,
    pub account_type: String,
    pub bank_document: String,
}

/// KYC record for one affiliate, as served to the admin review screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateKyc {
    pub kyc_status: KycStatus,
    pub details: KycDetails,
}

impl AffiliateKyc {
    /// Whether the submission is still open for an approve/reject decision.
    pub fn is_reviewable(&self) -> bool {
        self.kyc_status == KycStatus::Pending
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub mobile: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyOtpRequest<'a> {
    pub mobile: &'a str,
    pub otp: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct KycReviewRequest {
    pub approved: bool,
}
