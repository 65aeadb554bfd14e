//! probe.rs — Verificação de alcançabilidade por conexões TCP concorrentes
//!
//! Uma tentativa por endpoint, todas em paralelo. A rede está "up" assim que qualquer
//! uma conecta; "down" só depois que todas falharam.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time::{Duration, timeout};
use tracing::debug;

/// Resolvedores DNS públicos (Google, Cloudflare, Quad9) na porta 53.
pub const PUBLIC_RESOLVERS: [SocketAddr; 3] = [
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 53)),
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 1, 1, 1), 53)),
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(9, 9, 9, 9), 53)),
];

/// Fonte do resultado de conectividade consumido pelo scheduler.
pub trait Prober {
    fn probe(&self) -> impl Future<Output = bool> + Send;
}

/// Prober TCP: OR lógico sobre tentativas de conexão com timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    targets: Vec<SocketAddr>,
    timeout: Duration,
}

impl TcpProbe {
    pub fn public_resolvers(timeout: Duration) -> Self {
        Self::with_targets(PUBLIC_RESOLVERS.to_vec(), timeout)
    }

    pub fn with_targets(targets: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self { targets, timeout }
    }

    pub fn targets(&self) -> &[SocketAddr] {
        &self.targets
    }
}

/// Uma tentativa de conexão. O stream é fechado assim que a conexão é confirmada.
async fn attempt(target: SocketAddr, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect(target)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            debug!("[PROBE] {} falhou: {}", target, e);
            false
        }
        Err(_) => {
            debug!("[PROBE] {} sem resposta em {:?}", target, limit);
            false
        }
    }
}

impl Prober for TcpProbe {
    async fn probe(&self) -> bool {
        let mut attempts = JoinSet::new();
        for &target in &self.targets {
            attempts.spawn(attempt(target, self.timeout));
        }

        // Ao retornar cedo, o drop do JoinSet aborta as tentativas pendentes.
        while let Some(result) = attempts.join_next().await {
            match result {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("[PROBE] Tentativa abortada: {}", e),
            }
        }
        false
    }
}
