//! Two-step OTP login flow.
//!
//! Drives the phone → OTP handshake against the gateway and persists the
//! resulting session through the client's store. State moves only on remote
//! outcomes; every submission returns a notice the caller can surface.

use tracing::{info, warn};

use crate::error::ApiError;
use crate::session::Session;
use crate::ApiClient;

/// Which login form is in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Phone,
    Otp,
}

/// Severity channel for a notice.
///
/// `Validation` maps to the inline field error of the original forms; `Info`
/// and `Error` map to the transient toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
    Validation,
}

/// Human-readable outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub detail: Option<String>,
    pub kind: NoticeKind,
}

impl Notice {
    fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            kind: NoticeKind::Info,
        }
    }

    fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: Some(detail.into()),
            kind: NoticeKind::Error,
        }
    }

    fn validation(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            kind: NoticeKind::Validation,
        }
    }
}

/// Result of a phone submission.
#[derive(Debug, Clone)]
pub enum PhoneOutcome {
    /// OTP dispatched; the flow moved to the OTP step.
    CodeSent(Notice),
    /// Submission blocked or rejected; the flow stays on the phone step.
    Denied(Notice),
}

/// Result of an OTP submission.
#[derive(Debug)]
pub enum OtpOutcome {
    /// Verification succeeded; the session has been persisted.
    Authenticated { session: Session, notice: Notice },
    /// Verification failed; the flow stays on the OTP step.
    Denied(Notice),
}

/// Controller for the two-step OTP login.
pub struct LoginFlow {
    client: ApiClient,
    step: LoginStep,
    mobile: String,
}

impl LoginFlow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            step: LoginStep::Phone,
            mobile: String::new(),
        }
    }

    /// Step currently in front of the user.
    pub fn step(&self) -> LoginStep {
        self.step
    }

    /// Mobile number retained from the phone step.
    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Submit the phone number and request an OTP.
    ///
    /// Validation failures never reach the wire. The step advances to `Otp`
    /// only on a business-success reply; rejection and transport failure both
    /// keep it at `Phone`, differing only in the notice detail.
    pub async fn submit_phone(&mut self, mobile: &str) -> PhoneOutcome {
        let mobile = mobile.trim();
        if let Err(reason) = validate_mobile(mobile) {
            return PhoneOutcome::Denied(Notice::validation(reason));
        }

        match self.client.request_otp(mobile).await {
            Ok(envelope) => {
                info!(mobile, "OTP dispatched");
                self.mobile = mobile.to_string();
                self.step = LoginStep::Otp;
                let title = if envelope.msg.is_empty() {
                    "OTP sent".to_string()
                } else {
                    envelope.msg
                };
                PhoneOutcome::CodeSent(Notice::info(title))
            }
            Err(e) => {
                warn!(error = %e, "failed to send OTP");
                PhoneOutcome::Denied(failure_notice("Failed to Send OTP", &e))
            }
        }
    }

    /// Submit the OTP for the retained mobile number.
    ///
    /// On business-success the session is persisted before this returns. Any
    /// failure keeps the step at `Otp`; the entered code is the caller's to
    /// keep or discard.
    pub async fn submit_otp(&mut self, otp: &str) -> OtpOutcome {
        if self.step != LoginStep::Otp {
            return OtpOutcome::Denied(Notice::validation("Request an OTP first"));
        }
        let otp = otp.trim();
        if let Err(reason) = validate_otp(otp) {
            return OtpOutcome::Denied(Notice::validation(reason));
        }

        match self.client.verify_otp(&self.mobile, otp).await {
            Ok(envelope) => {
                let Some(result) = envelope.result else {
                    warn!("verify-otp reply missing result payload");
                    return OtpOutcome::Denied(Notice::error(
                        "Failed to Verify OTP",
                        "Something went wrong",
                    ));
                };
                let session = Session::from(result);
                if let Err(e) = self.client.sessions().save(session.clone()).await {
                    warn!(error = %e, "failed to persist session");
                    return OtpOutcome::Denied(Notice::error(
                        "Failed to Verify OTP",
                        e.to_string(),
                    ));
                }
                info!(mobile = %self.mobile, "login complete");
                let title = if envelope.msg.is_empty() {
                    "Logged in".to_string()
                } else {
                    envelope.msg
                };
                OtpOutcome::Authenticated {
                    session,
                    notice: Notice::info(title),
                }
            }
            Err(e) => {
                warn!(error = %e, "OTP verification failed");
                OtpOutcome::Denied(failure_notice("Failed to Verify OTP", &e))
            }
        }
    }

    /// Return to the phone step, discarding the entered code.
    ///
    /// No remote call; no-op when already there.
    pub fn go_back(&mut self) {
        self.step = LoginStep::Phone;
    }
}

/// Toast for a failed remote call: server-supplied message when the reply
/// carried one, generic fallback for dead transport.
fn failure_notice(title: &str, error: &ApiError) -> Notice {
    let detail = error
        .server_message()
        .unwrap_or("Something went wrong")
        .to_string();
    Notice::error(title, detail)
}

/// Mobile numbers: 10 to 15 digits, optional leading `+`.
fn validate_mobile(mobile: &str) -> std::result::Result<(), &'static str> {
    if mobile.is_empty() {
        return Err("Please enter your phone number");
    }
    let digits = mobile.strip_prefix('+').unwrap_or(mobile);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Please enter a valid phone number");
    }
    Ok(())
}

/// OTP codes: exactly six digits.
fn validate_otp(otp: &str) -> std::result::Result<(), &'static str> {
    if otp.is_empty() {
        return Err("Please enter the verification code");
    }
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err("Enter the 6-digit code");
    }
    Ok(())
}
