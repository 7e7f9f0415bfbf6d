// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Twilio Messages API.
//!
//! Provides [`TwilioClient`] which handles request construction,
//! authentication and the mapping of HTTP failures onto [`FailureKind`].
//! There is no retry here; a failed call is reported once and failover
//! decides what happens next.

use std::time::Duration;

use courier_core::{CourierError, FailureKind, ProviderMessageId, TransportError};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

const API_VERSION: &str = "2010-04-01";

/// Successful message creation response. Only the fields we read.
#[derive(Debug, Deserialize)]
struct MessageResource {
    #[serde(default)]
    sid: Option<String>,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated client for one Twilio account.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    /// Creates a client for `account_sid` against `base_url`
    /// (normally `https://api.twilio.com`).
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CourierError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn account_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}",
            self.base_url, self.account_sid
        )
    }

    /// Create one outbound message. `to` and `from` are sent as given.
    pub async fn create_message(
        &self,
        to: &str,
        from: &str,
        body: &str,
    ) -> Result<ProviderMessageId, TransportError> {
        let url = format!("{}/Messages.json", self.account_url());
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        debug!(status = %status, "message create response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::new(
                classify_status(status),
                describe_failure(status, &body),
            ));
        }

        // A 2xx means the provider took the message. A body we cannot read
        // still counts; the empty identifier is flagged by validation later.
        let sid = response
            .json::<MessageResource>()
            .await
            .ok()
            .and_then(|m| m.sid)
            .unwrap_or_default();
        Ok(ProviderMessageId(sid))
    }

    /// Fetch the account resource to confirm reachability and credentials.
    pub async fn check_account(&self) -> Result<(), TransportError> {
        let url = format!("{}.json", self.account_url());
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::new(
            classify_status(status),
            describe_failure(status, &body),
        ))
    }
}

/// Map a non-success HTTP status onto a failure kind.
///
/// 401/403 are credential problems, 429 is throttling, any other 4xx means
/// the provider refused this request, and everything else is an outage.
pub fn classify_status(status: StatusCode) -> FailureKind {
    match status.as_u16() {
        401 | 403 => FailureKind::AuthenticationFailure,
        429 => FailureKind::RateLimited,
        400..=499 => FailureKind::RecipientRejected,
        _ => FailureKind::ProviderOutage,
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("provider did not answer in time: {e}"))
    } else {
        TransportError::outage(format!("HTTP request failed: {e}"))
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(ApiErrorResponse {
            code: Some(code),
            message: Some(message),
        }) => format!("Twilio error {code} ({status}): {message}"),
        Ok(ApiErrorResponse {
            message: Some(message),
            ..
        }) => format!("Twilio returned {status}: {message}"),
        _ if body.is_empty() => format!("Twilio returned {status}"),
        _ => format!("Twilio returned {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SID: &str = "SM0123456789abcdef0123456789abcdef";
    const ACCOUNT: &str = "AC00000000000000000000000000000000";

    fn test_client(base_url: &str) -> TwilioClient {
        TwilioClient::new(ACCOUNT, "secret", base_url, Duration::from_secs(5)).unwrap()
    }

    fn messages_path() -> String {
        format!("/2010-04-01/Accounts/{ACCOUNT}/Messages.json")
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            FailureKind::AuthenticationFailure
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            FailureKind::AuthenticationFailure
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_status(StatusCode::BAD_REQUEST),
            FailureKind::RecipientRejected
        );
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            FailureKind::RecipientRejected
        );
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE),
            FailureKind::ProviderOutage
        );
    }

    #[tokio::test]
    async fn create_message_posts_form_with_basic_auth() {
        let server = MockServer::start().await;
        // base64("AC000...:secret")
        let auth = "Basic QUMwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDpzZWNyZXQ=";

        Mock::given(method("POST"))
            .and(path(messages_path()))
            .and(header("authorization", auth))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("To=%2B27821234567"))
            .and(body_string_contains("Body=hello+there"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"sid": SID, "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = test_client(&server.uri())
            .create_message("+27821234567", "+15005550006", "hello there")
            .await
            .unwrap();
        assert_eq!(id.as_str(), SID);
    }

    #[tokio::test]
    async fn error_body_is_folded_into_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(messages_path()))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .create_message("+27821234567", "+15005550006", "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::RecipientRejected);
        assert!(err.detail.contains("21211"), "{}", err.detail);
    }

    #[tokio::test]
    async fn success_without_sid_yields_empty_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(messages_path()))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let id = test_client(&server.uri())
            .create_message("+27821234567", "+15005550006", "x")
            .await
            .unwrap();
        assert_eq!(id.as_str(), "");
    }

    #[tokio::test]
    async fn slow_provider_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client =
            TwilioClient::new(ACCOUNT, "secret", server.uri(), Duration::from_millis(200)).unwrap();
        let err = client
            .create_message("+27821234567", "+15005550006", "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Timeout);
    }

    #[tokio::test]
    async fn unreachable_host_is_an_outage() {
        // Nothing listens on port 9 of localhost in the test environment.
        let client =
            TwilioClient::new(ACCOUNT, "secret", "http://127.0.0.1:9", Duration::from_secs(2))
                .unwrap();
        let err = client
            .create_message("+27821234567", "+15005550006", "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::ProviderOutage);
    }

    #[tokio::test]
    async fn check_account_maps_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/2010-04-01/Accounts/{ACCOUNT}.json")))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).check_account().await.unwrap_err();
        assert_eq!(err.kind, FailureKind::AuthenticationFailure);
    }
}
