//! Cluster View Module
//!
//! Bookkeeping for the storage nodes this client is connected to.
//!
//! ## Core Concepts
//! - **Node**: One storage server, identified by its address and owning a persistent
//!   connection for as long as it stays in the view.
//! - **ClusterView**: The ordered list of connected nodes held by `NodeRegistry`. Order is
//!   the connection-attempt order at startup; rejoined nodes are appended.
//! - **Startup**: Every configured address is tried once. Unreachable ones are skipped,
//!   and an empty result is the only fatal condition of the client.
//!
//! The registry performs no locking. It is mutated only by the membership flow, and
//! queries work on a snapshot of node handles taken at dispatch start.

pub mod registry;
pub mod types;

pub use registry::NodeRegistry;
pub use types::Node;
