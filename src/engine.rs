//! Batch Orchestrator
//!
//! Builds one batch envelope per tick:
//!
//! ```text
//!   prefix (16 random bytes)
//!     │
//!     ├── D2C ──────► Ingress ──────► Egress
//!     │   span A      span B          span C
//!     │               parent A        parent B
//!     │
//!     └── ThirdParty D2C ──► ThirdParty Ingress      (third-party-logs only)
//!         span D              span E, parent D
//! ```
//!
//! Nothing is kept between batches.

use crate::catalog::Catalog;
use crate::core::BatchEnvelope;
use crate::error::GeneratorError;
use crate::generator;
use crate::trace::CorrelationChain;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Compile-time default for appending the third-party chain
pub const THIRD_PARTY_LOGS_ENABLED: bool = cfg!(feature = "third-party-logs");

/// Where the send loop gets each tick's batch
pub trait BatchSource {
    fn next_batch<R: Rng>(&self, rng: &mut R) -> Result<BatchEnvelope, GeneratorError>;
}

#[derive(Debug, Clone)]
pub struct BatchBuilder {
    catalog: Catalog,
    third_party_enabled: bool,
}

impl BatchBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            third_party_enabled: THIRD_PARTY_LOGS_ENABLED,
        }
    }

    pub fn with_third_party(mut self, enabled: bool) -> Self {
        self.third_party_enabled = enabled;
        self
    }

    pub fn third_party_enabled(&self) -> bool {
        self.third_party_enabled
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Records produced per batch
    pub fn records_per_batch(&self) -> usize {
        if self.third_party_active() { 5 } else { 3 }
    }

    fn third_party_active(&self) -> bool {
        self.third_party_enabled && self.catalog.has_third_party()
    }

    pub fn build(&self, rng: &mut impl Rng) -> Result<BatchEnvelope, GeneratorError> {
        self.build_at(rng, Utc::now())
    }

    /// Build a batch with every timestamp derived from `now`
    pub fn build_at(
        &self,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Result<BatchEnvelope, GeneratorError> {
        let mut envelope = BatchEnvelope::new();
        let mut chain = CorrelationChain::new(rng);

        let d2c_hop = chain.next_hop(rng);
        let device = self.catalog.pick_device(rng);
        let d2c = generator::generate_d2c(rng, now, &d2c_hop.correlation_id, device)?;

        let ingress_hop = chain.next_hop(rng);
        let ingress = generator::generate_ingress(
            rng,
            now,
            &ingress_hop.correlation_id,
            &d2c_hop.span_id,
        )?;

        let egress_hop = chain.next_hop(rng);
        let endpoint = self.catalog.pick_endpoint(rng);
        let egress = generator::generate_egress(
            rng,
            now,
            &egress_hop.correlation_id,
            &ingress_hop.span_id,
            endpoint,
        )?;

        envelope.push(d2c);
        envelope.push(ingress);
        envelope.push(egress);

        if self.third_party_active() {
            if let Some((service, service_endpoint)) = self.catalog.pick_third_party(rng) {
                let mut third_party = chain.fork();

                let tp_d2c_hop = third_party.next_hop(rng);
                let tp_d2c = generator::generate_third_party_d2c(
                    rng,
                    now,
                    &tp_d2c_hop.correlation_id,
                    device,
                    service,
                )?;

                let tp_ingress_hop = third_party.next_hop(rng);
                let tp_ingress = generator::generate_third_party_ingress(
                    rng,
                    now,
                    &tp_ingress_hop.correlation_id,
                    &tp_d2c_hop.span_id,
                    service,
                    service_endpoint,
                )?;

                envelope.push(tp_d2c);
                envelope.push(tp_ingress);
            }
        }

        Ok(envelope)
    }
}

impl BatchSource for BatchBuilder {
    fn next_batch<R: Rng>(&self, rng: &mut R) -> Result<BatchEnvelope, GeneratorError> {
        self.build(rng)
    }
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}
