//! Send loop
//!
//! One batch and one publish attempt per tick, then a fixed sleep. A failed
//! tick is logged and counted; it never ends the loop.

use crate::engine::{BatchBuilder, BatchSource};
use crate::publisher::Publisher;
use bytes::Bytes;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub ticks: u64,
    pub batches_sent: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub publish_failures: u64,
    pub generation_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Sent { records: usize, bytes: usize },
    PublishFailed,
    /// Batch could not be built; nothing was sent
    Abandoned,
}

pub struct Sender<P, R, B = BatchBuilder> {
    publisher: P,
    builder: B,
    rng: R,
    interval: Duration,
    stats: SenderStats,
}

impl<P: Publisher, R: Rng, B: BatchSource> Sender<P, R, B> {
    pub fn new(publisher: P, builder: B, rng: R, interval: Duration) -> Self {
        Self {
            publisher,
            builder,
            rng,
            interval,
            stats: SenderStats::default(),
        }
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Build, serialize and publish one batch
    pub async fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;
        let tick = self.stats.ticks;
        let message_id = Uuid::new_v4();

        let built = self
            .builder
            .next_batch(&mut self.rng)
            .and_then(|batch| Ok((batch.len(), batch.to_json()?)));

        let (records, json) = match built {
            Ok(v) => v,
            Err(e) => {
                self.stats.generation_failures += 1;
                error!(tick, error = %e, "Abandoned tick, batch could not be built");
                return TickOutcome::Abandoned;
            }
        };

        let bytes = json.len();
        info!(tick, %message_id, records, bytes, "Sending batch");

        match self.publisher.send(Bytes::from(json)).await {
            Ok(()) => {
                self.stats.batches_sent += 1;
                self.stats.records_sent += records as u64;
                self.stats.bytes_sent += bytes as u64;
                TickOutcome::Sent { records, bytes }
            }
            Err(e) => {
                self.stats.publish_failures += 1;
                error!(tick, %message_id, error = %e, "Failed to publish batch");
                TickOutcome::PublishFailed
            }
        }
    }

    /// Tick every `interval` until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F) -> SenderStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            self.tick().await;

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            ticks = self.stats.ticks,
            sent = self.stats.batches_sent,
            failed = self.stats.publish_failures,
            abandoned = self.stats.generation_failures,
            "Sender stopped"
        );
        self.stats.clone()
    }
}
