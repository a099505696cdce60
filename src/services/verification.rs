//! Connection verification backends
//!
//! The portal never checks credentials itself. It hands the accepted form
//! to a [`ConnectionVerifier`] and reports whatever that returns.

use crate::{
    config::{VerifierConfig, VerifierMode},
    http_client::handle_http_response,
};
use anyhow::{Context, Result};
use log::{debug, info};
#[cfg(feature = "mock")]
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::{fmt, time::Duration};
use tokio::time::sleep;
use trait_variant::make;

#[derive(Clone, Deserialize, Serialize, Validate)]
pub struct VerificationRequest {
    #[validate(min_length = 1)]
    pub ssid: String,
    /// Length policy is enforced by `validate_passwords`, here only presence
    #[validate(min_length = 1)]
    pub password: String,
    pub mac: String,
    pub ip: String,
}

impl fmt::Debug for VerificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationRequest")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("mac", &self.mac)
            .field("ip", &self.ip)
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct VerificationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[make(Send)]
#[cfg_attr(feature = "mock", automock)]
pub trait ConnectionVerifier {
    /// Short name reported by the health check
    fn kind(&self) -> &'static str;

    async fn verify(&self, request: VerificationRequest) -> Result<VerificationResponse>;
}

/// Stand-in that always succeeds after a fixed delay
#[derive(Clone, Debug)]
pub struct SimulatedVerifier {
    delay: Duration,
}

impl SimulatedVerifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ConnectionVerifier for SimulatedVerifier {
    fn kind(&self) -> &'static str {
        "simulated"
    }

    async fn verify(&self, request: VerificationRequest) -> Result<VerificationResponse> {
        debug!("simulated verification of {request:?}");
        sleep(self.delay).await;

        Ok(VerificationResponse {
            success: true,
            message: None,
        })
    }
}

/// Forwards the request as JSON to an external verification endpoint
#[derive(Clone, Debug)]
pub struct HttpVerifier {
    client: Client,
    endpoint: String,
}

impl HttpVerifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create verification http client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl ConnectionVerifier for HttpVerifier {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn verify(&self, request: VerificationRequest) -> Result<VerificationResponse> {
        request
            .validate()
            .context("verification request validation failed")?;

        info!("verify {request:?} at {}", self.endpoint);

        let res = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("failed to send verification request")?;

        let body = handle_http_response(res, "verification request").await?;

        serde_json::from_str(&body).context("failed to parse verification response")
    }
}

/// Verifier selected by configuration
#[derive(Clone, Debug)]
pub enum Verifier {
    Simulated(SimulatedVerifier),
    Http(HttpVerifier),
}

impl Verifier {
    pub fn from_config(config: &VerifierConfig) -> Result<Self> {
        match &config.mode {
            VerifierMode::Simulated => Ok(Verifier::Simulated(SimulatedVerifier::new(
                config.simulated_delay,
            ))),
            VerifierMode::Http { endpoint } => Ok(Verifier::Http(HttpVerifier::new(endpoint)?)),
        }
    }
}

impl ConnectionVerifier for Verifier {
    fn kind(&self) -> &'static str {
        match self {
            Verifier::Simulated(verifier) => verifier.kind(),
            Verifier::Http(verifier) => verifier.kind(),
        }
    }

    async fn verify(&self, request: VerificationRequest) -> Result<VerificationResponse> {
        match self {
            Verifier::Simulated(verifier) => verifier.verify(request).await,
            Verifier::Http(verifier) => verifier.verify(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        i18n::Language,
        services::validation::{PasswordCheck, validate_passwords},
    };

    fn request(password: &str) -> VerificationRequest {
        VerificationRequest {
            ssid: "Home-5G".to_string(),
            password: password.to_string(),
            mac: "00:1A:2B:3C:4D:5E".to_string(),
            ip: "192.168.1.100".to_string(),
        }
    }

    #[test]
    fn debug_output_redacts_password() {
        let output = format!("{:?}", request("hunter2hunter2"));
        assert!(!output.contains("hunter2"));
        assert!(output.contains("<redacted>"));
        assert!(output.contains("Home-5G"));
    }

    #[test]
    fn request_requires_ssid_and_password() {
        assert!(request("longenough1").validate().is_ok());
        assert!(request("").validate().is_err());

        let mut missing_ssid = request("longenough1");
        missing_ssid.ssid.clear();
        assert!(missing_ssid.validate().is_err());
    }

    #[test]
    fn request_accepts_what_the_form_accepts() {
        // eight chars forming four grapheme clusters
        let password = "e\u{301}".repeat(4);
        let result = validate_passwords(Language::En, &password, &password);
        assert_eq!(result.check, PasswordCheck::Accepted);
        assert!(request(&password).validate().is_ok());

        // short passwords are the form's concern
        assert!(request("short").validate().is_ok());
    }

    #[tokio::test]
    async fn simulated_verifier_always_succeeds() {
        let verifier = SimulatedVerifier::new(Duration::from_millis(1));
        let response = verifier.verify(request("longenough1")).await.unwrap();
        assert!(response.success);
    }

    #[test]
    fn verifier_from_config() {
        let simulated = Verifier::from_config(&VerifierConfig::default()).unwrap();
        assert_eq!(simulated.kind(), "simulated");

        let http = Verifier::from_config(&VerifierConfig {
            mode: VerifierMode::Http {
                endpoint: "http://127.0.0.1:9/verify".to_string(),
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(http.kind(), "http");
    }

    #[test]
    fn response_message_is_optional() {
        let response: VerificationResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(
            response,
            VerificationResponse {
                success: false,
                message: None
            }
        );
    }
}
