// Common test utilities

#![allow(dead_code)]

use affiliate_api::{ApiClient, ClientConfig, SessionStore};
use serde_json::json;
use wiremock::MockServer;

/// Client with an in-memory session store pointed at the mock server.
pub fn test_client(server: &MockServer) -> ApiClient {
    test_client_with_store(server, SessionStore::in_memory())
}

pub fn test_client_with_store(server: &MockServer, store: SessionStore) -> ApiClient {
    ApiClient::new(&ClientConfig::for_base_url(server.uri()), store)
        .expect("client should build")
}

/// The backend's business envelope without a result payload.
pub fn envelope(status: u16, success: bool, msg: &str) -> serde_json::Value {
    json!({ "status": status, "success": success, "msg": msg })
}

/// Envelope carrying a result payload.
pub fn envelope_with_result(
    status: u16,
    success: bool,
    msg: &str,
    result: serde_json::Value,
) -> serde_json::Value {
    json!({ "status": status, "success": success, "msg": msg, "result": result })
}

/// The credentials payload returned by a successful verify-otp call.
pub fn login_result(access_token: &str) -> serde_json::Value {
    json!({
        "accessToken": access_token,
        "refreshToken": "ref-456",
        "user": { "name": "Asha", "role": "affiliate" }
    })
}

/// A pending KYC record as served by the admin endpoint.
pub fn kyc_record(status: &str) -> serde_json::Value {
    json!({
        "kycStatus": status,
        "details": {
            "idType": "PAN",
            "idValue": "ABCDE1234F",
            "idDocument": "pan.jpg",
            "accountNumber": "00112233",
            "ifsc": "HDFC0001234",
            "accountName": "Asha Rao",
            "bankName": "HDFC",
            "accountType": "Savings",
            "bankDocument": "passbook.jpg"
        }
    })
}
