//! DBLP Cluster Client Library
//!
//! Coordinator-side client for a sharded, replicated DBLP store. Storage nodes each hold
//! overlapping chunks of the dataset; this crate fans a query out to all of them and
//! reports a total in which every chunk is counted once.
//!
//! ## Architecture Modules
//! - **`cluster`**: The ordered view of connected storage nodes (`NodeRegistry`).
//! - **`transport`**: Framed request/response exchange over each node's TCP connection,
//!   with per-call deadlines.
//! - **`query`**: Validation, parallel dispatch, and the deduplicating aggregate.
//! - **`membership`**: Group administration opcodes and quorum-guarded fault injection.
//! - **`config`**: Node list and tunables from the environment and command line.
//! - **`console`**: The interactive menu used by the binary.

pub mod cluster;
pub mod config;
pub mod console;
pub mod error;
pub mod membership;
pub mod query;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
