//! The proxy listener: accepts client connections and spawns a forwarding
//! pair for each, on the default multi-threaded `tokio` runtime.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use super::error::ProxyResult;
use super::pair::run_pair;

/// Configuration for one `bolt-proxy` run.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen_addr: SocketAddr,
    pub upstream_addr: SocketAddr,
}

pub struct ProxyServer {
    config: ProxyConfig,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Self {
        ProxyServer { config }
    }

    /// Accept connections until the listener errors or the process is
    /// asked to stop; each connection runs in its own spawned task.
    pub async fn run(&self) -> ProxyResult<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        log::info!(
            target: "bolt_proxy",
            "listening on {} -> {}",
            self.config.listen_addr, self.config.upstream_addr
        );

        loop {
            let (socket, peer) = listener.accept().await?;
            log::debug!(target: "bolt_proxy", "accepted {peer}");
            let upstream_addr = self.config.upstream_addr;
            tokio::spawn(async move {
                if let Err(e) = run_pair(socket, upstream_addr).await {
                    log::error!(target: "bolt_proxy", "connection from {peer} failed: {e}");
                }
            });
        }
    }
}
