//! Startup configuration
//!
//! Everything except the connection secret is a fixed constant. The secret is
//! read once from the environment and validated before the send loop starts.

use crate::error::ConfigError;
use std::time::Duration;

pub const CONNECTION_STRING_ENV: &str = "E2E_DIAGNOSTICS_EVENT_HUB_CONNECTION_STRING";
pub const EVENT_HUB_NAME: &str = "insights-logs-e2ediagnostics";

pub const SEND_INTERVAL: Duration = Duration::from_millis(2000);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const SAS_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Parsed `Endpoint=sb://...;SharedAccessKeyName=...;SharedAccessKey=...` string
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Namespace host, e.g. `myns.servicebus.windows.net`
    pub host: String,
    pub key_name: String,
    pub key: String,
    pub entity_path: Option<String>,
}

// Keep the key out of logs
impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("host", &self.host)
            .field("key_name", &self.key_name)
            .field("key", &"<redacted>")
            .field("entity_path", &self.entity_path)
            .finish()
    }
}

impl ConnectionString {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut entity_path = None;

        for part in s.trim().split(';').filter(|p| !p.trim().is_empty()) {
            // Keys are base64 and may end in '=', so split on the first one only
            let (name, value) = part.split_once('=').ok_or_else(|| {
                ConfigError::MalformedConnectionString(format!("entry without '=': {:?}", part))
            })?;
            let value = value.trim().to_string();

            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "sharedaccesskeyname" => key_name = Some(value),
                "sharedaccesskey" => key = Some(value),
                "entitypath" => entity_path = Some(value),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEntry("Endpoint"))?;
        let key_name = key_name
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEntry("SharedAccessKeyName"))?;
        let key = key
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEntry("SharedAccessKey"))?;

        let host = endpoint
            .strip_prefix("sb://")
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|h| !h.is_empty() && !h.contains('/'))
            .ok_or_else(|| {
                ConfigError::MalformedConnectionString(format!(
                    "endpoint must look like sb://<host>/, got {:?}",
                    endpoint
                ))
            })?
            .to_string();

        Ok(Self {
            host,
            key_name,
            key,
            entity_path: entity_path.filter(|v| !v.is_empty()),
        })
    }
}

/// Event hub names: 1-256 chars of letters, digits, `.`, `_`, `-`,
/// starting and ending with a letter or digit.
pub fn validate_hub_name(name: &str) -> Result<(), ConfigError> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());

    if name.len() > 256 || !starts_ok || !ends_ok || !name.chars().all(valid_char) {
        return Err(ConfigError::InvalidHubName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SenderConfig {
    pub connection: ConnectionString,
    pub event_hub: String,
    pub send_interval: Duration,
    pub request_timeout: Duration,
    pub token_ttl: Duration,
}

impl SenderConfig {
    /// Load from [`CONNECTION_STRING_ENV`]; fails if unset or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`SenderConfig::from_env`] with a caller-supplied variable lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = get(CONNECTION_STRING_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingEnv(CONNECTION_STRING_ENV))?;
        Self::from_connection_string(&raw)
    }

    pub fn from_connection_string(raw: &str) -> Result<Self, ConfigError> {
        let connection = ConnectionString::parse(raw)?;
        Self::new(connection, EVENT_HUB_NAME)
    }

    pub fn new(connection: ConnectionString, event_hub: &str) -> Result<Self, ConfigError> {
        validate_hub_name(event_hub)?;

        if let Some(entity) = &connection.entity_path {
            if entity != event_hub {
                return Err(ConfigError::EntityMismatch {
                    expected: event_hub.to_string(),
                    found: entity.clone(),
                });
            }
        }

        Ok(Self {
            connection,
            event_hub: event_hub.to_string(),
            send_interval: SEND_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            token_ttl: SAS_TOKEN_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "Endpoint=sb://rentu-e2e.servicebus.windows.net/;SharedAccessKeyName=RootManageSharedAccessKey;SharedAccessKey=c2VjcmV0a2V5PQ==";

    #[test]
    fn test_parse_connection_string() {
        let cs = ConnectionString::parse(RAW).unwrap();
        assert_eq!(cs.host, "rentu-e2e.servicebus.windows.net");
        assert_eq!(cs.key_name, "RootManageSharedAccessKey");
        assert_eq!(cs.key, "c2VjcmV0a2V5PQ==");
        assert_eq!(cs.entity_path, None);
        assert!(!format!("{:?}", cs).contains("c2VjcmV0"));
    }

    #[test]
    fn test_parse_tolerates_case_and_trailing_separator() {
        let cs = ConnectionString::parse(
            "endpoint=sb://ns.servicebus.windows.net;sharedaccesskeyname=k;sharedaccesskey=v;EntityPath=insights-logs-e2ediagnostics;",
        )
        .unwrap();
        assert_eq!(cs.host, "ns.servicebus.windows.net");
        assert_eq!(cs.entity_path.as_deref(), Some(EVENT_HUB_NAME));
    }

    #[test]
    fn test_parse_missing_entries() {
        assert_eq!(
            ConnectionString::parse("SharedAccessKeyName=k;SharedAccessKey=v").unwrap_err(),
            ConfigError::MissingEntry("Endpoint")
        );
        assert_eq!(
            ConnectionString::parse("Endpoint=sb://ns/;SharedAccessKey=v").unwrap_err(),
            ConfigError::MissingEntry("SharedAccessKeyName")
        );
        assert_eq!(
            ConnectionString::parse("Endpoint=sb://ns/;SharedAccessKeyName=k").unwrap_err(),
            ConfigError::MissingEntry("SharedAccessKey")
        );
    }

    #[test]
    fn test_parse_rejects_bad_endpoint() {
        let err = ConnectionString::parse(
            "Endpoint=https://ns.servicebus.windows.net/;SharedAccessKeyName=k;SharedAccessKey=v",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedConnectionString(_)));

        let err = ConnectionString::parse("garbage").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedConnectionString(_)));
    }

    #[test]
    fn test_hub_name_validation() {
        assert!(validate_hub_name(EVENT_HUB_NAME).is_ok());
        assert!(validate_hub_name("").is_err());
        assert!(validate_hub_name("-leading").is_err());
        assert!(validate_hub_name("has space").is_err());
        assert!(validate_hub_name("trailing.").is_err());
    }

    #[test]
    fn test_missing_or_blank_secret_fails_fast() {
        assert_eq!(
            SenderConfig::from_lookup(|_| None).unwrap_err(),
            ConfigError::MissingEnv(CONNECTION_STRING_ENV)
        );
        assert_eq!(
            SenderConfig::from_lookup(|_| Some("  ".to_string())).unwrap_err(),
            ConfigError::MissingEnv(CONNECTION_STRING_ENV)
        );

        let config = SenderConfig::from_lookup(|name| {
            (name == CONNECTION_STRING_ENV).then(|| RAW.to_string())
        })
        .unwrap();
        assert_eq!(config.connection.key_name, "RootManageSharedAccessKey");
    }

    #[test]
    fn test_entity_path_must_match_hub() {
        let raw = format!("{};EntityPath=other-hub", RAW);
        let err = SenderConfig::from_connection_string(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::EntityMismatch { .. }));

        let config = SenderConfig::from_connection_string(RAW).unwrap();
        assert_eq!(config.event_hub, EVENT_HUB_NAME);
        assert_eq!(config.send_interval, Duration::from_millis(2000));
    }
}
