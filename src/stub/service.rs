//! The stub server: binds one listener per script and plays each
//! accepted connection against that script.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Socket, Type};
use tokio::net::TcpListener;

use crate::script::{self, Script};

use super::actor::{Actor, StepOutcome};
use super::error::StubError;

/// Process exit code for a clean idle timeout with no activity.
pub const EXIT_TIMEOUT: i32 = 99;
/// Process exit code for a keyboard interrupt.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Configuration for one `bolt-stub` run.
#[derive(Debug, Clone)]
pub struct StubConfig {
    pub scripts: Vec<PathBuf>,
    pub listen_host: String,
    pub base_port: u16,
    pub idle_timeout: Duration,
    pub exit_on_disconnect: bool,
}

impl Default for StubConfig {
    fn default() -> Self {
        StubConfig {
            scripts: Vec::new(),
            listen_host: "localhost".to_string(),
            base_port: 17601,
            idle_timeout: Duration::from_secs(30),
            exit_on_disconnect: false,
        }
    }
}

/// Binds a listening socket with `SO_REUSEADDR` so rapid test restarts
/// don't stall on `TIME_WAIT`.
fn bind_reusable(addr: SocketAddr) -> std::io::Result<std::net::TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;
    Ok(socket.into())
}

pub struct StubService {
    config: StubConfig,
}

impl StubService {
    pub fn new(config: StubConfig) -> Self {
        StubService { config }
    }

    /// Run every configured script's listener to completion (or until the
    /// idle-timeout watchdog fires), returning the process exit code.
    ///
    /// Must be called from within a `tokio::task::LocalSet` on a
    /// current-thread runtime: connections are driven with `spawn_local`,
    /// one OS thread multiplexing every listener and Actor.
    pub async fn run(&self) -> i32 {
        let mut scripts = Vec::new();
        for path in &self.config.scripts {
            match script::load(path) {
                Ok(s) => scripts.push(s),
                Err(e) => {
                    log::error!(target: "bolt_stub", "failed to load script {}: {e}", path.display());
                    return 2;
                }
            }
        }
        if scripts.is_empty() {
            log::warn!(target: "bolt_stub", "no scripts provided, nothing to serve");
            return 0;
        }

        let exit_code = Arc::new(AtomicI32::new(0));
        let mut tasks = Vec::new();

        for (i, parsed) in scripts.into_iter().enumerate() {
            let port = parsed.port.unwrap_or(self.config.base_port + i as u16);
            let addr: SocketAddr = match format!("{}:{port}", self.config.listen_host).parse() {
                Ok(a) => a,
                Err(e) => {
                    log::error!(target: "bolt_stub", "invalid listen address: {e}");
                    return 2;
                }
            };
            let std_listener = match bind_reusable(addr) {
                Ok(l) => l,
                Err(e) => {
                    log::error!(target: "bolt_stub", "failed to bind {addr}: {e}");
                    return 2;
                }
            };
            let listener = match TcpListener::from_std(std_listener) {
                Ok(l) => l,
                Err(e) => {
                    log::error!(target: "bolt_stub", "failed to adopt listener on {addr}: {e}");
                    return 2;
                }
            };
            log::info!(target: "bolt_stub", "serving {} on {addr}", parsed.filename);

            let script = Arc::new(parsed);
            let exit_on_disconnect = self.config.exit_on_disconnect;
            let exit_code = Arc::clone(&exit_code);
            tasks.push(tokio::task::spawn_local(async move {
                serve_listener(listener, script, exit_on_disconnect, exit_code).await;
            }));
        }

        let all_done = async {
            for task in tasks {
                let _ = task.await;
            }
        };
        tokio::pin!(all_done);
        let timeout = tokio::time::sleep(self.config.idle_timeout);
        tokio::pin!(timeout);

        tokio::select! {
            _ = &mut all_done => {}
            _ = &mut timeout => {
                log::warn!(target: "bolt_stub", "idle timeout after {:?} with no completed connection", self.config.idle_timeout);
                return EXIT_TIMEOUT;
            }
        }

        exit_code.load(Ordering::SeqCst)
    }
}

async fn serve_listener(
    listener: TcpListener,
    script: Arc<Script>,
    exit_on_disconnect: bool,
    exit_code: Arc<AtomicI32>,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                log::error!(target: "bolt_stub", "accept failed: {e}");
                exit_code.store(2, Ordering::SeqCst);
                return;
            }
        };
        log::debug!(target: "bolt_stub", "accepted connection from {peer}");

        let outcome = play_connection(socket, Arc::clone(&script)).await;
        match outcome {
            Ok(StepOutcome::Continue) | Ok(StepOutcome::Exit) => {}
            Err(e) => {
                log::error!(target: "bolt_stub", "{}: {e}", script.filename);
                exit_code.store(e.exit_code(), Ordering::SeqCst);
            }
        }

        if exit_on_disconnect {
            return;
        }
    }
}

async fn play_connection(
    socket: tokio::net::TcpStream,
    script: Arc<Script>,
) -> Result<StepOutcome, StubError> {
    let mut actor = Actor::new(socket, script);
    actor.handshake().await?;
    actor.play().await
}
