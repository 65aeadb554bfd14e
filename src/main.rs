mod config;
mod lifecycle;
mod outage;
mod probe;
mod scheduler;
mod storage;
mod tracker;
mod types;

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging no stderr; o stdout fica só com o eco dos registros
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::load()?;
    info!("Configuração carregada: {:?}", config);

    let prober = probe::TcpProbe::public_resolvers(config.probe_timeout());
    info!("Alvos do probe: {:?}", prober.targets());
    let sink = storage::FileLogSink::new(&config.log_path);
    info!("Registrando eventos em {}", sink.path().display());

    let mut tracker =
        tracker::DowntimeTracker::new(sink, config.rollover_policy(), Local::now().fixed_offset());

    let lifecycle = Arc::new(lifecycle::LifecycleManager::new());
    let signals = {
        let lifecycle = Arc::clone(&lifecycle);
        tokio::spawn(async move {
            if let Err(e) = lifecycle.wait_for_signal().await {
                error!("Falha ao registrar handlers de sinal: {:?}", e);
            }
        })
    };

    scheduler::run_scheduler(
        config.poll_interval(),
        &prober,
        &mut tracker,
        lifecycle.subscribe(),
    )
    .await;

    signals.abort();
    Ok(())
}
