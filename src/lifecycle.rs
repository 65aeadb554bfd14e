use std::io;
use tokio::sync::watch;
use tracing::info;

/// Sinal de encerramento compartilhado entre o loop de polling e os handlers de sinal do SO.
#[derive(Debug)]
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown(&self) {
        info!("[ENCERRAMENTO] Sinal de encerramento enviado");
        self.shutdown_tx.send_replace(true);
    }

    /// Aguarda SIGINT/SIGTERM (Ctrl+C fora de unix) e dispara o encerramento.
    pub async fn wait_for_signal(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            tokio::select! {
                _ = sigint.recv() => info!("SIGINT recebido"),
                _ = sigterm.recv() => info!("SIGTERM recebido"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C recebido");
        }

        self.shutdown();
        Ok(())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
