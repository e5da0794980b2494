//! `bolt-proxy` - a transparent Bolt proxy that relays and decodes traffic
//! between a client and a real server.

use std::process::ExitCode;

use clap::Parser;

use boltkit_rs::config;
use boltkit_rs::proxy::ProxyServer;

/// Relay Bolt traffic between a client and a real server, logging each
/// framed message in symbolic form.
#[derive(Parser, Debug)]
#[command(name = "bolt-proxy", about = "Transparent Bolt proxy")]
struct Cli {
    /// Address to listen for client connections on, e.g. `127.0.0.1:17687`.
    #[arg(short = 'l', long = "listen")]
    listen_addr: String,

    /// Address of the real Bolt server to forward to, e.g. `127.0.0.1:7687`.
    #[arg(short = 'u', long = "upstream")]
    upstream_addr: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match config::build_proxy_config(&cli.listen_addr, &cli.upstream_addr) {
        Ok(c) => c,
        Err(e) => {
            log::error!(target: "bolt_proxy", "invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let server = ProxyServer::new(config);
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                log::error!(target: "bolt_proxy", "{e}");
                return ExitCode::from(2);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::warn!(target: "bolt_proxy", "interrupted");
            return ExitCode::from(130);
        }
    }
    ExitCode::SUCCESS
}
