//! Distributed Query Module
//!
//! Answers "how many records match author X within years Y" by asking every connected
//! storage node and merging their partial answers.
//!
//! ## Core Concepts
//! - **Partial result**: Each node reports, per chunk it holds, how many records match.
//! - **Dedup merge**: Chunks are replicated, so the aggregate counts each chunk at most
//!   once no matter how many nodes report it.
//! - **Fault tolerance**: A node that fails, times out, or answers garbage contributes
//!   nothing; the query still completes with the rest.
//! - **Coverage warning**: When fewer distinct chunks answered than the dataset holds, the
//!   reported total may be lower than the truth.
//!
//! ## Submodules
//! - **`types`**: Requests, partial results, and the final report.
//! - **`validation`**: Author and `[start,end]` year-range checks.
//! - **`protocol`**: Query frame encoding and response decoding.
//! - **`aggregator`**: The per-query dedup state.
//! - **`dispatcher`**: Concurrent fan-out and the completion barrier.

pub mod aggregator;
pub mod dispatcher;
pub mod protocol;
pub mod types;
pub mod validation;

pub use aggregator::AggregateState;
pub use dispatcher::QueryDispatcher;
pub use types::{AggregateSnapshot, PartialResult, QueryReport, QueryRequest, YearRange};
