//! Event Hub Publisher - HTTP batch publishing
//!
//! The send loop only needs one operation, [`Publisher::send`]. The production
//! implementation posts each batch to the Event Hubs REST endpoint with a
//! Shared Access Signature derived from the connection string.

use crate::config::SenderConfig;
use crate::error::PublishError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use sha2::Sha256;
use std::time::Duration;
use tracing::debug;

pub const EVENT_HUB_API_VERSION: &str = "2014-01";
pub const EVENT_CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";

/// Anything that can take one serialized batch
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn send(&self, payload: Bytes) -> Result<(), PublishError>;
}

fn url_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// `SharedAccessSignature sr=..&sig=..&se=..&skn=..` for `resource_uri`,
/// valid until `expiry` (unix seconds).
pub fn sas_token(
    resource_uri: &str,
    key_name: &str,
    key: &str,
    expiry: i64,
) -> Result<String, PublishError> {
    let encoded_uri = url_encode(&resource_uri.to_lowercase());
    let string_to_sign = format!("{}\n{}", encoded_uri, expiry);

    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|e| PublishError::Signature(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
        encoded_uri,
        url_encode(&signature),
        expiry,
        key_name
    ))
}

pub struct EventHubPublisher {
    client: reqwest::Client,
    resource_uri: String,
    send_url: String,
    key_name: String,
    key: String,
    token_ttl: Duration,
}

impl EventHubPublisher {
    pub fn new(config: &SenderConfig) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let resource_uri = format!("https://{}/{}", config.connection.host, config.event_hub);
        let send_url = format!(
            "{}/messages?timeout={}&api-version={}",
            resource_uri,
            config.request_timeout.as_secs(),
            EVENT_HUB_API_VERSION
        );

        Ok(Self {
            client,
            resource_uri,
            send_url,
            key_name: config.connection.key_name.clone(),
            key: config.connection.key.clone(),
            token_ttl: config.token_ttl,
        })
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    fn authorization(&self) -> Result<String, PublishError> {
        let expiry = Utc::now().timestamp() + self.token_ttl.as_secs() as i64;
        sas_token(&self.resource_uri, &self.key_name, &self.key, expiry)
    }
}

#[async_trait]
impl Publisher for EventHubPublisher {
    async fn send(&self, payload: Bytes) -> Result<(), PublishError> {
        let bytes = payload.len();
        let response = self
            .client
            .post(&self.send_url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(CONTENT_TYPE, EVENT_CONTENT_TYPE)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(bytes, status = %status, "Event hub accepted batch");
            return Ok(());
        }

        Err(rejected(status, response.text().await))
    }
}

/// Rejection error for a non-2xx reply; an unreadable body becomes empty
fn rejected<E: std::fmt::Display>(status: StatusCode, body: Result<String, E>) -> PublishError {
    let body = body.unwrap_or_else(|e| {
        debug!(status = %status, error = %e, "Failed to read event hub response body");
        String::new()
    });
    PublishError::Rejected {
        status: status.as_u16(),
        body,
    }
}
