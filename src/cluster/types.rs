use std::fmt;
use std::sync::Arc;

use crate::transport::Connection;

/// A storage server in the cluster view.
///
/// Identity is the address. Clones share the same underlying connection, which is how
/// the dispatcher hands nodes to its per-node tasks.
#[derive(Debug, Clone)]
pub struct Node {
    address: String,
    connection: Arc<Connection>,
}

impl Node {
    pub fn new(address: String, connection: Connection) -> Self {
        Self {
            address,
            connection: Arc::new(connection),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn is_alive(&self) -> bool {
        self.connection.is_alive()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Node {}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
