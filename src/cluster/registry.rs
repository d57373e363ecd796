use tracing::{info, warn};

use super::types::Node;
use crate::error::RegistryError;
use crate::transport::Transport;

/// The ordered set of currently reachable storage nodes.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    /// Connects to every address in order, skipping the ones that fail.
    ///
    /// # Returns
    /// * `Err(NoReachableNodes)` if not a single address accepted a connection.
    pub async fn connect<I, S>(addresses: I, transport: &Transport) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut nodes = Vec::new();
        let mut attempted = 0;

        for address in addresses {
            attempted += 1;
            let address = address.as_ref();
            match transport.connect(address).await {
                Ok(node) => {
                    info!("Connected to storage server {}", address);
                    nodes.push(node);
                }
                Err(e) => {
                    warn!("Skipping storage server {}: {}", address, e);
                }
            }
        }

        if nodes.is_empty() {
            return Err(RegistryError::NoReachableNodes { attempted });
        }

        info!("{} of {} storage servers reachable", nodes.len(), attempted);
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// The administrative contact: the first node of the view.
    pub fn coordinator(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        if index < self.nodes.len() {
            Some(self.nodes.remove(index))
        } else {
            None
        }
    }

    pub fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn position(&self, address: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.address() == address)
    }

    pub fn addresses(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| node.address().to_string())
            .collect()
    }

    /// Node handles for one query. Later view changes do not affect the copy.
    pub fn snapshot(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Closes every connection and empties the view.
    pub async fn close_all(&mut self) {
        for node in self.nodes.drain(..) {
            node.connection().close().await;
        }
    }
}
