//! A single proxied client<->server connection pair: transparent relay
//! plus decode-and-log of every framed message.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::bolt::{self, BoltVersion, ConnectionState, ServerOutcome};
use crate::packstream::{self, Value as WireValue};

use super::error::{ProxyError, ProxyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Client,
    Server,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Client => "C",
            Role::Server => "S",
        }
    }
}

/// Accept one client connection, open the matching upstream, and relay the
/// Bolt handshake plus every subsequent framed message until either side
/// closes.
pub async fn run_pair(client: TcpStream, upstream_addr: SocketAddr) -> ProxyResult<()> {
    let peer = client.peer_addr().ok();
    let mut upstream = TcpStream::connect(upstream_addr)
        .await
        .map_err(|e| ProxyError::UpstreamConnect {
            addr: upstream_addr.to_string(),
            source: e,
        })?;

    let (mut client_r, mut client_w) = client.into_split();
    let (mut up_r, mut up_w) = upstream.into_split();

    let mut preamble = [0u8; 20];
    client_r.read_exact(&mut preamble).await?;
    up_w.write_all(&preamble).await?;
    up_w.flush().await?;

    let mut reply = [0u8; 4];
    up_r.read_exact(&mut reply).await?;
    client_w.write_all(&reply).await?;
    client_w.flush().await?;

    if reply == [0, 0, 0, 0] {
        log::info!(target: "bolt_proxy", "upstream refused all proposed versions for {peer:?}");
        return Ok(());
    }
    let version = bolt::BoltVersion::from_wire_bytes(reply);
    log::info!(target: "bolt_proxy", "negotiated Bolt {version} for {peer:?}");

    let state = Arc::new(Mutex::new(ConnectionState::Versioned));

    let client_to_server = forward_messages(client_r, up_w, version, Role::Client, Arc::clone(&state));
    let server_to_client = forward_messages(up_r, client_w, version, Role::Server, state);

    let (c2s, s2c) = tokio::join!(
        tokio::spawn(client_to_server),
        tokio::spawn(server_to_client)
    );
    c2s.map_err(|e| ProxyError::Io(std::io::Error::other(e)))??;
    s2c.map_err(|e| ProxyError::Io(std::io::Error::other(e)))??;
    Ok(())
}

/// Forward chunks as they arrive (bytes hit the wire before a message is
/// fully reassembled) while accumulating each message's payload so it can
/// be decoded and logged once its terminator chunk arrives.
async fn forward_messages<R, W>(
    mut reader: R,
    mut writer: W,
    version: BoltVersion,
    role: Role,
    state: Arc<Mutex<ConnectionState>>,
) -> ProxyResult<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut accum = Vec::new();
    loop {
        let mut len_buf = [0u8; 2];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        writer.write_all(&len_buf).await?;
        let len = u16::from_be_bytes(len_buf) as usize;
        if len == 0 {
            writer.flush().await?;
            if !accum.is_empty() {
                log_and_track(role, version, &accum, &state);
            }
            accum.clear();
            continue;
        }
        let mut chunk = vec![0u8; len];
        reader.read_exact(&mut chunk).await?;
        writer.write_all(&chunk).await?;
        writer.flush().await?;
        accum.extend_from_slice(&chunk);
    }
}

/// Map a server message tag to the outcome the READY/STREAMING/FAILED
/// machine cares about.
fn server_outcome(tag: u8) -> Option<ServerOutcome> {
    match tag {
        0x70 => Some(ServerOutcome::Success),
        0x71 => Some(ServerOutcome::Record),
        0x7E => Some(ServerOutcome::Ignored),
        0x7F => Some(ServerOutcome::Failure),
        _ => None,
    }
}

/// Decode and log one message, then advance the shared connection state the
/// same way `bolt::state` models a real server's READY/STREAMING/FAILED
/// cycle: a client message by name, a server message by its outcome tag.
fn log_and_track(role: Role, version: BoltVersion, payload: &[u8], state: &Mutex<ConnectionState>) {
    match packstream::unpack(payload) {
        Ok((WireValue::Struct { tag, fields }, _)) => {
            let name = match role {
                Role::Client => bolt::client_name(version, tag),
                Role::Server => bolt::server_name(version, tag),
            }
            .unwrap_or("<UNKNOWN>");
            log::info!(target: "bolt_proxy", "{}: {name} {fields:?}", role.prefix());

            let mut guard = state.lock().unwrap();
            *guard = match role {
                Role::Client => guard.on_client_message(name),
                Role::Server => match server_outcome(tag) {
                    Some(outcome) => guard.on_server_outcome(outcome),
                    None => *guard,
                },
            };
        }
        Ok((other, _)) => {
            log::warn!(target: "bolt_proxy", "{}: non-structure payload {other:?}", role.prefix());
        }
        Err(e) => {
            log::warn!(target: "bolt_proxy", "{}: failed to decode message: {e}", role.prefix());
        }
    }
}
