// src/scheduler.rs

use crate::probe::Prober;
use crate::storage::LogSink;
use crate::tracker::DowntimeTracker;
use chrono::Local;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Loop de polling: probe → tracker a cada `poll_interval`, até o sinal de encerramento.
///
/// Um probe em andamento é abandonado quando o encerramento chega.
pub async fn run_scheduler<P, S, O>(
    poll_interval: Duration,
    prober: &P,
    tracker: &mut DowntimeTracker<S, O>,
    mut shutdown: watch::Receiver<bool>,
) where
    P: Prober,
    S: LogSink,
    O: Write,
{
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle_number: u64 = 0;

    info!(
        "[ESTADO: MONITORAMENTO ATIVO] Polling a cada {:?}.",
        poll_interval
    );

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        cycle_number += 1;
        let probe_start = Instant::now();
        let is_up = tokio::select! {
            up = prober.probe() => up,
            _ = shutdown.changed() => {
                debug!("[CICLO {}] Probe abandonado pelo encerramento.", cycle_number);
                break;
            }
        };

        tracker.on_poll(is_up, Local::now().fixed_offset());
        debug!(
            "[CICLO {}] up={} em {:?}, estado={}.",
            cycle_number,
            is_up,
            probe_start.elapsed(),
            tracker.state()
        );
    }

    info!("[ENCERRAMENTO] Loop finalizado após {} ciclos.", cycle_number);
    tracker.report_shutdown();
}
