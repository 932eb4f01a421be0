use iot_diag_sim::{BatchBuilder, Catalog, EventHubPublisher, Sender, SenderConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = match SenderConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let publisher = match EventHubPublisher::new(&config) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to create event hub client");
            return ExitCode::FAILURE;
        }
    };

    let builder = BatchBuilder::new(Catalog::default());

    info!(
        host = %config.connection.host,
        event_hub = %config.event_hub,
        interval_ms = config.send_interval.as_millis() as u64,
        third_party = builder.third_party_enabled(),
        "Diagnostics sender initialized"
    );
    println!("Press Ctrl-C to stop the sender process");

    let mut sender = Sender::new(
        publisher,
        builder,
        StdRng::from_os_rng(),
        config.send_interval,
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let stats = sender.run_until(shutdown).await;

    println!("\n=== Sender Report ===");
    println!("Ticks:            {}", stats.ticks);
    println!("Batches sent:     {}", stats.batches_sent);
    println!("Records sent:     {}", stats.records_sent);
    println!("Bytes sent:       {}", stats.bytes_sent);
    println!("Publish failures: {}", stats.publish_failures);
    println!("Abandoned ticks:  {}", stats.generation_failures);

    ExitCode::SUCCESS
}
