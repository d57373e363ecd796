use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

use super::framing::{DEFAULT_MAX_FRAME_LEN, FrameError, Framing};
use crate::cluster::types::Node;
use crate::error::TransportError;

/// Default per-exchange deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An open connection to one storage node.
///
/// The stream sits behind an async mutex so that only one exchange is in flight on it.
/// `alive` flips to false once the stream is closed or left in an unknown state.
#[derive(Debug)]
pub struct Connection {
    stream: Mutex<Option<TcpStream>>,
    alive: AtomicBool,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
            alive: AtomicBool::new(true),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Closes the stream. Waits for an exchange that is currently using it.
    pub async fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.stream.lock().await.take();
    }

    fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Ok(mut stream) = self.stream.try_lock() {
            stream.take();
        }
    }
}

/// Request/response exchange with storage nodes.
///
/// Cheap to clone; holds only settings. Connections live on the `Node`s.
#[derive(Debug, Clone)]
pub struct Transport {
    framing: Framing,
    request_timeout: Duration,
    max_frame_len: usize,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Framing::default(), DEFAULT_REQUEST_TIMEOUT)
    }
}

impl Transport {
    pub fn new(framing: Framing, request_timeout: Duration) -> Self {
        Self {
            framing,
            request_timeout,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Opens a connection to `address`, bounded by the request timeout.
    pub async fn connect(&self, address: &str) -> Result<Node, TransportError> {
        let stream = tokio::time::timeout(self.request_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                address: address.to_string(),
                timeout: self.request_timeout,
            })?
            .map_err(|source| TransportError::ConnectFailed {
                address: address.to_string(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle on {}: {}", address, e);
        }

        Ok(Node::new(address.to_string(), Connection::new(stream)))
    }

    /// Writes `request` to `node` and returns its complete response frame.
    ///
    /// Any failure, including the deadline expiring, leaves the connection dead.
    pub async fn send(&self, node: &Node, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let outcome =
            tokio::time::timeout(self.request_timeout, self.exchange(node, request, true)).await;

        let result = match outcome {
            Ok(result) => result.map(|response| response.unwrap_or_default()),
            Err(_) => Err(TransportError::Timeout {
                address: node.address().to_string(),
                timeout: self.request_timeout,
            }),
        };

        if let Err(e) = &result {
            self.poison(node, e);
        }
        result
    }

    /// Writes `request` to `node` without waiting for any reply.
    pub async fn send_only(&self, node: &Node, request: &[u8]) -> Result<(), TransportError> {
        let outcome =
            tokio::time::timeout(self.request_timeout, self.exchange(node, request, false)).await;

        let result = match outcome {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(TransportError::Timeout {
                address: node.address().to_string(),
                timeout: self.request_timeout,
            }),
        };

        if let Err(e) = &result {
            self.poison(node, e);
        }
        result
    }

    async fn exchange(
        &self,
        node: &Node,
        request: &[u8],
        expect_reply: bool,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let address = node.address();
        let connection = node.connection();

        let mut guard = connection.stream.lock().await;
        let stream = match guard.as_mut() {
            Some(stream) if connection.is_alive() => stream,
            _ => {
                return Err(TransportError::ConnectionClosed {
                    address: address.to_string(),
                });
            }
        };

        self.framing
            .write_frame(stream, request)
            .await
            .map_err(|source| TransportError::SendFailed {
                address: address.to_string(),
                source,
            })?;

        if !expect_reply {
            return Ok(None);
        }

        let response = self
            .framing
            .read_frame(stream, self.max_frame_len)
            .await
            .map_err(|e| match e {
                FrameError::Io(source) => TransportError::ReceiveFailed {
                    address: address.to_string(),
                    source,
                },
                FrameError::TooLarge { len, max } => TransportError::FrameTooLarge {
                    address: address.to_string(),
                    len,
                    max,
                },
                FrameError::Truncated { capacity } => TransportError::ResponseTruncated {
                    address: address.to_string(),
                    capacity,
                },
            })?;

        debug!("Received {} bytes from {}", response.len(), address);
        Ok(Some(response))
    }

    fn poison(&self, node: &Node, error: &TransportError) {
        if matches!(error, TransportError::ConnectionClosed { .. }) {
            return;
        }
        debug!("Marking connection to {} dead: {}", node.address(), error);
        node.connection().mark_dead();
    }
}
