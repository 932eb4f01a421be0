//! Record generators, one per hop kind.
//!
//! Each generator fills in the kind-specific properties blob, a duration where
//! the hop has one, and rolls its own error level. Time is passed in so a whole
//! batch can be stamped with one instant.

use crate::core::{Level, OperationName, Record, format_timestamp};
use crate::error::GeneratorError;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

pub const MESSAGE_SIZE: &str = "1000";
pub const ENDPOINT_TYPE: &str = "EventHub";
pub const ROUTING_ENABLED: &str = "true";

/// Callee clock skew relative to the caller, in milliseconds
pub const CALLEE_OFFSET_MS: std::ops::Range<i64> = 500..1000;
pub const DURATION_MS: std::ops::Range<u32> = 1..1000;

/// One draw in `ERROR_ODDS` marks a record as `Error`
pub const ERROR_ODDS: u32 = 1000;
const ERROR_DRAW: u32 = 100;

// ============================================================================
// Properties blobs
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct D2cProperties<'a> {
    message_size: &'a str,
    device_id: &'a str,
    caller_local_time_utc: String,
    callee_local_time_utc: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct IngressProperties<'a> {
    is_routing_enabled: &'a str,
    parent_span_id: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EgressProperties<'a> {
    endpoint_type: &'a str,
    endpoint_name: &'a str,
    parent_span_id: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThirdPartyD2cProperties<'a> {
    message_size: &'a str,
    device_id: &'a str,
    third_party_service_name: &'a str,
    caller_local_time_utc: String,
    callee_local_time_utc: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThirdPartyIngressProperties<'a> {
    third_party_service_name: &'a str,
    endpoint_name: &'a str,
    parent_span_id: &'a str,
}

// ============================================================================
// Shared draws
// ============================================================================

fn roll_level(rng: &mut impl Rng) -> Level {
    if rng.random_range(0..ERROR_ODDS) == ERROR_DRAW {
        Level::Error
    } else {
        Level::Information
    }
}

fn random_duration(rng: &mut impl Rng) -> String {
    rng.random_range(DURATION_MS).to_string()
}

/// `(caller, callee)` local times for a device send
fn device_clocks(rng: &mut impl Rng, now: DateTime<Utc>) -> (String, String) {
    let offset = Duration::milliseconds(rng.random_range(CALLEE_OFFSET_MS));
    (format_timestamp(now), format_timestamp(now + offset))
}

// ============================================================================
// Generators
// ============================================================================

/// Device-to-cloud send
pub fn generate_d2c(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    correlation_id: &str,
    device_name: &str,
) -> Result<Record, GeneratorError> {
    let (caller, callee) = device_clocks(rng, now);
    let properties = D2cProperties {
        message_size: MESSAGE_SIZE,
        device_id: device_name,
        caller_local_time_utc: caller,
        callee_local_time_utc: callee,
    };

    Record::new(
        now,
        OperationName::D2c,
        String::new(),
        correlation_id.to_string(),
        &properties,
        roll_level(rng),
    )
}

pub fn generate_ingress(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    correlation_id: &str,
    parent_span_id: &str,
) -> Result<Record, GeneratorError> {
    let duration = random_duration(rng);
    let properties = IngressProperties {
        is_routing_enabled: ROUTING_ENABLED,
        parent_span_id,
    };

    Record::new(
        now,
        OperationName::Ingress,
        duration,
        correlation_id.to_string(),
        &properties,
        roll_level(rng),
    )
}

/// Routing of the message to a custom endpoint
pub fn generate_egress(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    correlation_id: &str,
    parent_span_id: &str,
    endpoint_name: &str,
) -> Result<Record, GeneratorError> {
    let duration = random_duration(rng);
    let properties = EgressProperties {
        endpoint_type: ENDPOINT_TYPE,
        endpoint_name,
        parent_span_id,
    };

    Record::new(
        now,
        OperationName::Egress,
        duration,
        correlation_id.to_string(),
        &properties,
        roll_level(rng),
    )
}

pub fn generate_third_party_d2c(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    correlation_id: &str,
    device_name: &str,
    service_name: &str,
) -> Result<Record, GeneratorError> {
    let (caller, callee) = device_clocks(rng, now);
    let properties = ThirdPartyD2cProperties {
        message_size: MESSAGE_SIZE,
        device_id: device_name,
        third_party_service_name: service_name,
        caller_local_time_utc: caller,
        callee_local_time_utc: callee,
    };

    Record::new(
        now,
        OperationName::ThirdPartyD2c,
        String::new(),
        correlation_id.to_string(),
        &properties,
        roll_level(rng),
    )
}

pub fn generate_third_party_ingress(
    rng: &mut impl Rng,
    now: DateTime<Utc>,
    correlation_id: &str,
    parent_span_id: &str,
    service_name: &str,
    endpoint_name: &str,
) -> Result<Record, GeneratorError> {
    let duration = random_duration(rng);
    let properties = ThirdPartyIngressProperties {
        third_party_service_name: service_name,
        endpoint_name,
        parent_span_id,
    };

    Record::new(
        now,
        OperationName::ThirdPartyIngress,
        duration,
        correlation_id.to_string(),
        &properties,
        roll_level(rng),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const CID: &str = "00-0102030405060708090a0b0c0d0e0f10-1112131415161718-01";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_d2c_record() {
        let mut rng = StdRng::seed_from_u64(21);
        let record = generate_d2c(&mut rng, fixed_now(), CID, "myDevice2").unwrap();

        assert_eq!(record.operation_name, OperationName::D2c);
        assert_eq!(record.duration_ms, "");
        assert_eq!(record.correlation_id, CID);
        assert_eq!(record.time, "2024-01-02T03:04:05.000Z");

        let props = record.properties_value().unwrap();
        assert_eq!(props["messageSize"], "1000");
        assert_eq!(props["deviceId"], "myDevice2");
        assert_eq!(props["callerLocalTimeUtc"], "2024-01-02T03:04:05.000Z");

        let callee = DateTime::parse_from_rfc3339(props["calleeLocalTimeUtc"].as_str().unwrap())
            .unwrap()
            .with_timezone(&Utc);
        let skew = (callee - fixed_now()).num_milliseconds();
        assert!((500..1000).contains(&skew), "skew {}", skew);
        assert!(record.parent_span_id().is_none());
    }

    #[test]
    fn test_d2c_property_order() {
        let mut rng = StdRng::seed_from_u64(22);
        let record = generate_d2c(&mut rng, fixed_now(), CID, "myDevice1").unwrap();
        assert!(record.properties.starts_with(
            r#"{"messageSize":"1000","deviceId":"myDevice1","callerLocalTimeUtc":"2024-01-02T03:04:05.000Z","calleeLocalTimeUtc":""#
        ));
    }

    #[test]
    fn test_ingress_and_egress_records() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..200 {
            let ingress = generate_ingress(&mut rng, fixed_now(), CID, "aaaa").unwrap();
            let d: u32 = ingress.duration_ms.parse().unwrap();
            assert!((1..1000).contains(&d));
            assert_eq!(
                ingress.properties,
                r#"{"isRoutingEnabled":"true","parentSpanId":"aaaa"}"#
            );

            let egress =
                generate_egress(&mut rng, fixed_now(), CID, "bbbb", "myEndpoint3").unwrap();
            let d: u32 = egress.duration_ms.parse().unwrap();
            assert!((1..1000).contains(&d));
            assert_eq!(
                egress.properties,
                r#"{"endpointType":"EventHub","endpointName":"myEndpoint3","parentSpanId":"bbbb"}"#
            );
        }
    }

    #[test]
    fn test_third_party_records() {
        let mut rng = StdRng::seed_from_u64(24);
        let d2c = generate_third_party_d2c(&mut rng, fixed_now(), CID, "myDevice1", "svc").unwrap();
        assert_eq!(d2c.operation_name, OperationName::ThirdPartyD2c);
        assert_eq!(d2c.duration_ms, "");
        let props = d2c.properties_value().unwrap();
        assert_eq!(props["thirdPartyServiceName"], "svc");
        assert_eq!(props["deviceId"], "myDevice1");

        let ingress =
            generate_third_party_ingress(&mut rng, fixed_now(), CID, "cccc", "svc", "ep").unwrap();
        assert_eq!(ingress.operation_name, OperationName::ThirdPartyIngress);
        assert_eq!(
            ingress.properties,
            r#"{"thirdPartyServiceName":"svc","endpointName":"ep","parentSpanId":"cccc"}"#
        );
        assert_eq!(ingress.parent_span_id().as_deref(), Some("cccc"));
    }

    #[test]
    fn test_error_rate_converges() {
        let mut rng = StdRng::seed_from_u64(25);
        let n = 200_000;
        let errors = (0..n)
            .filter(|_| roll_level(&mut rng) == Level::Error)
            .count();
        let rate = errors as f64 / n as f64;
        // expected 0.001, sd ~ 0.00007
        assert!((0.0007..0.0013).contains(&rate), "rate {}", rate);
    }
}
