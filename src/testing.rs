//! Loopback storage nodes for tests.
//!
//! Each mock listens on `127.0.0.1:0`, records every request it receives, and answers
//! according to a reply function.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::cluster::NodeRegistry;
use crate::transport::{Framing, Transport};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Answer with this payload, framed the way the client expects.
    Payload(Vec<u8>),
    /// Write these bytes as they are, without any framing.
    RawBytes(Vec<u8>),
    /// Answer with this payload after a pause.
    Delayed(Duration, Vec<u8>),
    /// Read the request and answer nothing (fire-and-forget opcodes).
    Silent,
    /// Keep the connection open but never answer.
    Hang,
    /// Drop the connection.
    Close,
}

pub(crate) struct MockNode {
    pub address: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Polls until `count` requests arrived or a second passes.
    pub async fn wait_for_requests(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let seen = self.requests();
            if seen.len() >= count {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.requests()
    }
}

pub(crate) async fn spawn_node<F>(framing: Framing, reply: F) -> MockNode
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let recorded = requests.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let recorded = recorded.clone();
            let reply = reply.clone();
            tokio::spawn(async move {
                serve(stream, framing, recorded, reply).await;
            });
        }
    });

    MockNode { address, requests }
}

/// A node that always answers with the same partial result.
pub(crate) async fn spawn_partial_node(framing: Framing, chunks: &[(&str, u64)]) -> MockNode {
    let body = partial_json(chunks);
    spawn_node(framing, move |_| Reply::Payload(body.clone())).await
}

async fn serve<F>(
    mut stream: TcpStream,
    framing: Framing,
    recorded: Arc<Mutex<Vec<String>>>,
    reply: Arc<F>,
) where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    loop {
        let request = match framing {
            Framing::LengthPrefixed => {
                let Ok(len) = stream.read_u32().await else {
                    return;
                };
                let mut buf = vec![0u8; len as usize];
                if stream.read_exact(&mut buf).await.is_err() {
                    return;
                }
                buf
            }
            Framing::Raw => {
                let mut buf = vec![0u8; 4096];
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => buf[..n].to_vec(),
                }
            }
        };

        let request = String::from_utf8_lossy(&request).into_owned();
        recorded.lock().unwrap().push(request.clone());

        let answer = match reply(&request) {
            Reply::Delayed(pause, body) => {
                tokio::time::sleep(pause).await;
                Reply::Payload(body)
            }
            other => other,
        };

        match answer {
            Reply::Payload(body) => {
                if framing == Framing::LengthPrefixed
                    && stream.write_u32(body.len() as u32).await.is_err()
                {
                    return;
                }
                if stream.write_all(&body).await.is_err() {
                    return;
                }
            }
            Reply::RawBytes(bytes) => {
                if stream.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            Reply::Delayed(..) | Reply::Silent => {}
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return;
            }
            Reply::Close => return,
        }
    }
}

pub(crate) fn partial_json(chunks: &[(&str, u64)]) -> Vec<u8> {
    let map: std::collections::HashMap<&str, u64> = chunks.iter().copied().collect();
    serde_json::to_vec(&map).unwrap()
}

/// An address nothing listens on.
pub(crate) async fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}

pub(crate) fn fast_transport() -> Transport {
    Transport::new(Framing::LengthPrefixed, Duration::from_millis(500))
}

pub(crate) async fn connect_all(transport: &Transport, nodes: &[MockNode]) -> NodeRegistry {
    NodeRegistry::connect(nodes.iter().map(|n| n.address.as_str()), transport)
        .await
        .unwrap()
}
