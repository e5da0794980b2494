//! Drives a real client -> proxy -> fake-server chain and checks that
//! bytes are relayed unchanged in both directions.

use std::time::Duration;

use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use boltkit_rs::bolt::MAGIC;
use boltkit_rs::packstream::{self, Value};
use boltkit_rs::proxy::{ProxyConfig, ProxyServer};

fn handshake_bytes(preferred: u8) -> Vec<u8> {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[0, 0, 0, preferred]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

async fn fake_server(listener: TcpListener) {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut preamble = [0u8; 20];
    socket.read_exact(&mut preamble).await.unwrap();
    socket.write_all(&[0, 0, 0, 3]).await.unwrap();

    let request = boltkit_rs::framing::read_message(&mut socket).await.unwrap().unwrap();
    let (value, _) = packstream::unpack(&request).unwrap();
    assert_eq!(
        value,
        Value::Struct {
            tag: 0x01,
            fields: vec![Value::Dict(vec![])]
        }
    );

    let reply = packstream::pack(&Value::Struct {
        tag: 0x70,
        fields: vec![Value::Dict(vec![])],
    })
    .unwrap();
    boltkit_rs::framing::write_message(&mut socket, &reply).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn proxy_relays_handshake_and_one_message() {
    let upstream_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream_listener.local_addr().unwrap();
    let server_task = tokio::spawn(fake_server(upstream_listener));

    let proxy_addr: std::net::SocketAddr = "127.0.0.1:17799".parse().unwrap();
    let proxy = ProxyServer::new(ProxyConfig {
        listen_addr: proxy_addr,
        upstream_addr,
    });
    tokio::spawn(async move {
        let _ = proxy.run().await;
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    client.write_all(&handshake_bytes(3)).await.unwrap();
    let mut reply = [0u8; 4];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0, 0, 0, 3]);

    let init_payload = packstream::pack(&Value::Struct {
        tag: 0x01,
        fields: vec![Value::Dict(vec![])],
    })
    .unwrap();
    boltkit_rs::framing::write_message(&mut client, &init_payload)
        .await
        .unwrap();

    let response = boltkit_rs::framing::read_message(&mut client).await.unwrap().unwrap();
    let (value, _) = packstream::unpack(&response).unwrap();
    assert_eq!(
        value,
        Value::Struct {
            tag: 0x70,
            fields: vec![Value::Dict(vec![])]
        }
    );

    server_task.await.unwrap();
}
