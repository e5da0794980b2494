//! Small validated config structs built from each binary's `clap::Parser`
//! output, mirroring a `Cli -> Config` conversion. Configuration here is
//! process-argument-only: no config file, no environment-variable layer.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::proxy::ProxyConfig;
use crate::stub::StubConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one script path is required")]
    NoScripts,

    #[error("invalid address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Build a [`StubConfig`] from parsed CLI fields.
pub fn build_stub_config(
    scripts: Vec<PathBuf>,
    listen_host: String,
    base_port: u16,
    idle_timeout_secs: u64,
    exit_on_disconnect: bool,
) -> Result<StubConfig, ConfigError> {
    if scripts.is_empty() {
        return Err(ConfigError::NoScripts);
    }
    Ok(StubConfig {
        scripts,
        listen_host,
        base_port,
        idle_timeout: Duration::from_secs(idle_timeout_secs),
        exit_on_disconnect,
    })
}

/// Build a [`ProxyConfig`] from parsed CLI fields.
pub fn build_proxy_config(listen_addr: &str, upstream_addr: &str) -> Result<ProxyConfig, ConfigError> {
    let listen_addr = listen_addr
        .parse::<SocketAddr>()
        .map_err(|source| ConfigError::InvalidAddress {
            value: listen_addr.to_string(),
            source,
        })?;
    let upstream_addr = upstream_addr
        .parse::<SocketAddr>()
        .map_err(|source| ConfigError::InvalidAddress {
            value: upstream_addr.to_string(),
            source,
        })?;
    Ok(ProxyConfig {
        listen_addr,
        upstream_addr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_script_list() {
        let err = build_stub_config(vec![], "localhost".into(), 17601, 30, false).unwrap_err();
        assert!(matches!(err, ConfigError::NoScripts));
    }

    #[test]
    fn rejects_bad_proxy_address() {
        let err = build_proxy_config("not-an-address", "127.0.0.1:7687").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { .. }));
    }

    #[test]
    fn builds_valid_proxy_config() {
        let cfg = build_proxy_config("127.0.0.1:17687", "127.0.0.1:7687").unwrap();
        assert_eq!(cfg.listen_addr.port(), 17687);
        assert_eq!(cfg.upstream_addr.port(), 7687);
    }
}
