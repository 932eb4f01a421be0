//! Candidate names the generators draw from.

use crate::error::ConfigError;
use rand::Rng;

pub const DEVICE_NAMES: &[&str] = &["myDevice1", "myDevice2", "myDevice3"];
pub const ENDPOINT_NAMES: &[&str] = &["myEndpoint1", "myEndpoint2", "myEndpoint3"];

/// Parallel to [`THIRD_PARTY_ENDPOINT_NAMES`]; entries pair up by index.
pub const THIRD_PARTY_SERVICE_NAMES: &[&str] = &[
    "myThirdPartyService1",
    "myThirdPartyService2",
    "myThirdPartyService3",
];
pub const THIRD_PARTY_ENDPOINT_NAMES: &[&str] = &[
    "myThirdPartyEndpoint1",
    "myThirdPartyEndpoint2",
    "myThirdPartyEndpoint3",
];

/// Fixed name lists for devices, routing endpoints and third-party services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    device_names: Vec<String>,
    endpoint_names: Vec<String>,
    third_party_services: Vec<String>,
    third_party_endpoints: Vec<String>,
}

impl Catalog {
    pub fn new(
        device_names: Vec<String>,
        endpoint_names: Vec<String>,
        third_party_services: Vec<String>,
        third_party_endpoints: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if device_names.is_empty() {
            return Err(ConfigError::InvalidCatalog("no device names".into()));
        }
        if endpoint_names.is_empty() {
            return Err(ConfigError::InvalidCatalog("no endpoint names".into()));
        }
        if third_party_services.len() != third_party_endpoints.len() {
            return Err(ConfigError::InvalidCatalog(format!(
                "{} third-party services but {} third-party endpoints",
                third_party_services.len(),
                third_party_endpoints.len()
            )));
        }

        Ok(Self {
            device_names,
            endpoint_names,
            third_party_services,
            third_party_endpoints,
        })
    }

    pub fn device_names(&self) -> &[String] {
        &self.device_names
    }

    pub fn endpoint_names(&self) -> &[String] {
        &self.endpoint_names
    }

    pub fn has_third_party(&self) -> bool {
        !self.third_party_services.is_empty()
    }

    pub fn pick_device(&self, rng: &mut impl Rng) -> &str {
        &self.device_names[rng.random_range(0..self.device_names.len())]
    }

    pub fn pick_endpoint(&self, rng: &mut impl Rng) -> &str {
        &self.endpoint_names[rng.random_range(0..self.endpoint_names.len())]
    }

    /// One index into both third-party lists: `(service, endpoint)`
    pub fn pick_third_party(&self, rng: &mut impl Rng) -> Option<(&str, &str)> {
        if self.third_party_services.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.third_party_services.len());
        Some((&self.third_party_services[i], &self.third_party_endpoints[i]))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }

        Self {
            device_names: owned(DEVICE_NAMES),
            endpoint_names: owned(ENDPOINT_NAMES),
            third_party_services: owned(THIRD_PARTY_SERVICE_NAMES),
            third_party_endpoints: owned(THIRD_PARTY_ENDPOINT_NAMES),
        }
    }
}
