//! Core Types for iot-diag-sim
//!
//! Wire types for the diagnostics batches. Field names and order follow the
//! downstream log schema exactly (camelCase, declaration order).

use crate::error::GeneratorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource every simulated record claims to come from
pub const RESOURCE_ID: &str = "/SUBSCRIPTIONS/FAAB228D-DF7A-4086-991E-E81C4659D41A/RESOURCEGROUPS/RENTU-E2E-DEV/PROVIDERS/MICROSOFT.DEVICES/IOTHUBS/RENTU-E2E-DEV-IOTHUB";

/// Millisecond-precision UTC layout used for `time` and the D2C timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// Record
// ============================================================================

/// Simulated hop kinds
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationName {
    #[serde(rename = "DiagnosticIoTHubD2C")]
    D2c,
    #[serde(rename = "DiagnosticIoTHubIngress")]
    Ingress,
    #[serde(rename = "DiagnosticIoTHubEgress")]
    Egress,
    #[serde(rename = "ThirdPartyServiceD2CLog")]
    ThirdPartyD2c,
    #[serde(rename = "ThirdPartyServiceIngressLog")]
    ThirdPartyIngress,
}

impl OperationName {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationName::D2c => "DiagnosticIoTHubD2C",
            OperationName::Ingress => "DiagnosticIoTHubIngress",
            OperationName::Egress => "DiagnosticIoTHubEgress",
            OperationName::ThirdPartyD2c => "ThirdPartyServiceD2CLog",
            OperationName::ThirdPartyIngress => "ThirdPartyServiceIngressLog",
        }
    }

    /// D2C-origin hops carry no duration
    pub fn is_device_origin(&self) -> bool {
        matches!(self, OperationName::D2c | OperationName::ThirdPartyD2c)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Information,
    Error,
}

/// One diagnostic log entry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub time: String,
    pub resource_id: String,
    pub operation_name: OperationName,
    pub duration_ms: String,
    pub correlation_id: String,
    /// Hop metadata, already serialized to a JSON string
    pub properties: String,
    pub level: Level,
}

impl Record {
    /// Build a record, serializing `properties` to the embedded JSON string.
    pub fn new<P: Serialize>(
        now: DateTime<Utc>,
        operation_name: OperationName,
        duration_ms: String,
        correlation_id: String,
        properties: &P,
        level: Level,
    ) -> Result<Self, GeneratorError> {
        let properties = serde_json::to_string(properties).map_err(GeneratorError::Properties)?;

        Ok(Self {
            time: format_timestamp(now),
            resource_id: RESOURCE_ID.to_string(),
            operation_name,
            duration_ms,
            correlation_id,
            properties,
            level,
        })
    }

    /// Parse the embedded properties blob back into a JSON value
    pub fn properties_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.properties)
    }

    /// `parentSpanId` from the properties blob, if this hop has a parent
    pub fn parent_span_id(&self) -> Option<String> {
        self.properties_value()
            .ok()?
            .get("parentSpanId")?
            .as_str()
            .map(str::to_string)
    }

    /// `(prefix, span_id)` segments of the correlation id
    pub fn correlation_segments(&self) -> Option<(&str, &str)> {
        let mut parts = self.correlation_id.split('-');
        let (version, prefix, span, flags) =
            (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        if version != "00" || flags != "01" || parts.next().is_some() {
            return None;
        }
        Some((prefix, span))
    }
}

// ============================================================================
// Batch Envelope
// ============================================================================

/// Payload of a single bus message
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEnvelope {
    pub records: Vec<Record>,
}

impl BatchEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compact JSON text, keys in declaration order
    pub fn to_json(&self) -> Result<String, GeneratorError> {
        serde_json::to_string(self).map_err(GeneratorError::Envelope)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
