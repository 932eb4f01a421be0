//! # iot-diag-sim - IoT Hub diagnostics log simulator
//!
//! Fabricates end-to-end diagnostics records for a simulated IoT message
//! pipeline and publishes them, one batch per tick, to an Event Hub.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Sender                             │
//! │                                                              │
//! │   ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │   │ BatchBuilder │──▶│ BatchEnvelope│──▶│   Publisher    │   │
//! │   │ (per tick)   │   │  (JSON)      │   │ (Event Hubs)   │   │
//! │   └──────────────┘   └──────────────┘   └────────────────┘   │
//! │          │                                                   │
//! │   ┌──────┴───────┐   ┌──────────────┐                        │
//! │   │ Correlation  │   │  Generators  │                        │
//! │   │ Chain        │──▶│  D2C/Ingress │                        │
//! │   │ (trace ids)  │   │  /Egress/3P  │                        │
//! │   └──────────────┘   └──────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records in one batch share a trace prefix and link to each other through
//! `parentSpanId` inside their properties blob, so downstream tooling can
//! stitch D2C → Ingress → Egress back together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iot_diag_sim::BatchBuilder;
//! use rand::SeedableRng;
//!
//! let builder = BatchBuilder::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let batch = builder.build(&mut rng).unwrap();
//! println!("{}", batch.to_json().unwrap());
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod generator;
pub mod publisher;
pub mod sender;
pub mod trace;

pub use catalog::Catalog;
pub use config::{ConnectionString, SenderConfig};
pub use self::core::{BatchEnvelope, Level, OperationName, Record};
pub use engine::{BatchBuilder, BatchSource, THIRD_PARTY_LOGS_ENABLED};
pub use error::{ConfigError, GeneratorError, PublishError};
pub use publisher::{EventHubPublisher, Publisher};
pub use sender::{Sender, SenderStats, TickOutcome};
pub use trace::{CorrelationChain, Hop, build_correlation_id, encode_hex};
