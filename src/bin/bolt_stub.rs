//! `bolt-stub` - a scriptable Bolt stub server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use boltkit_rs::config;
use boltkit_rs::stub::StubService;

/// Play one or more Bolt scripts against incoming connections.
#[derive(Parser, Debug)]
#[command(name = "bolt-stub", about = "Scriptable Bolt stub server")]
struct Cli {
    /// Script files to serve, one listener per script.
    #[arg(required = true)]
    scripts: Vec<PathBuf>,

    /// Host to bind listeners on.
    #[arg(short = 'l', long = "listen-host", default_value = "localhost")]
    listen_host: String,

    /// Base port for scripts that don't declare their own `!: PORT`.
    #[arg(short = 'p', long = "base-port", default_value_t = 17601)]
    base_port: u16,

    /// Idle timeout in seconds before the service gives up and exits 99.
    #[arg(short = 't', long = "timeout", default_value_t = 30)]
    timeout_secs: u64,

    /// Stop the listener after the first connection's script completes.
    #[arg(short = 'x', long = "exit-on-disconnect")]
    exit_on_disconnect: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match config::build_stub_config(
        cli.scripts,
        cli.listen_host,
        cli.base_port,
        cli.timeout_secs,
        cli.exit_on_disconnect,
    ) {
        Ok(c) => c,
        Err(e) => {
            log::error!(target: "bolt_stub", "invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!(target: "bolt_stub", "failed to start runtime: {e}");
            return ExitCode::from(2);
        }
    };

    let local = tokio::task::LocalSet::new();
    let service = StubService::new(config);
    let code = runtime.block_on(local.run_until(async move {
        tokio::select! {
            code = service.run() => code,
            _ = tokio::signal::ctrl_c() => {
                log::warn!(target: "bolt_stub", "interrupted");
                boltkit_rs::stub::EXIT_INTERRUPTED
            }
        }
    }));
    ExitCode::from(code as u8)
}
