//! Parallel fan-out of a query to every node in the view.
//!
//! ## Lifecycle
//! 1. **Dispatch**: The request is encoded once and one task is spawned per node.
//! 2. **Merge**: Each task decodes its node's answer and merges it into the shared
//!    `AggregateState` as soon as it arrives. Merge order does not matter.
//! 3. **Barrier**: The dispatcher awaits every task. A failed node contributes nothing and
//!    is listed in the report; it never aborts the query.
//! 4. **Report**: The aggregate is read once and dropped with the query.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use super::aggregator::AggregateState;
use super::protocol::{decode_partial, encode_query};
use super::types::{NodeFailure, QueryId, QueryReport, QueryRequest};
use crate::cluster::types::Node;
use crate::error::NodeQueryError;
use crate::transport::Transport;

/// Number of chunks in the full DBLP dataset.
pub const DEFAULT_TOTAL_CHUNKS: usize = 117;

pub struct QueryDispatcher {
    transport: Transport,
    total_chunks: usize,
}

impl QueryDispatcher {
    /// # Arguments
    /// * `total_chunks` - Chunk count of the whole dataset, used for the undercount warning.
    pub fn new(transport: Transport, total_chunks: usize) -> Self {
        Self {
            transport,
            total_chunks,
        }
    }

    /// Runs `request` against every node of `view` and waits for all of them.
    pub async fn execute(&self, view: &[Node], request: &QueryRequest) -> QueryReport {
        self.execute_with_cancel(view, request, &CancellationToken::new()).await
    }

    /// Like `execute`, but stops waiting once `cancel` fires. Outstanding node tasks are
    /// aborted, their connections closed, and each is listed as a cancelled failure. The
    /// report holds whatever was merged until then.
    pub async fn execute_with_cancel(
        &self,
        view: &[Node],
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> QueryReport {
        let query_id = QueryId::new();
        let span = info_span!("query", id = %query_id);

        info!(
            parent: &span,
            "Dispatching query for author '{}' ({:?}) to {} node(s)",
            request.author(),
            request.years(),
            view.len()
        );

        let frame: Arc<[u8]> = encode_query(request).into();
        let state = Arc::new(AggregateState::new());
        let started = Instant::now();

        let mut handles = Vec::with_capacity(view.len());
        for node in view.iter().cloned() {
            let transport = self.transport.clone();
            let state = state.clone();
            let frame = frame.clone();
            let target = node.clone();

            let handle = tokio::spawn(
                async move { query_node(&transport, &target, &frame, &state).await }
                    .instrument(span.clone()),
            );
            handles.push((node, handle));
        }

        let mut failures = Vec::new();
        let mut cancelled = false;

        for (node, mut handle) in handles {
            let address = node.address().to_string();

            let joined = tokio::select! {
                joined = &mut handle => Some(joined),
                _ = cancel.cancelled() => None,
            };

            let joined = match joined {
                Some(joined) => joined,
                None if handle.is_finished() => handle.await,
                None => {
                    if !cancelled {
                        warn!(parent: &span, "Query cancelled while waiting for {}", address);
                        cancelled = true;
                    }
                    handle.abort();
                    // The request is already on the wire; a late reply must not reach the
                    // next query on this stream.
                    node.connection().close().await;
                    let error = NodeQueryError::Cancelled {
                        address: address.clone(),
                    };
                    failures.push(NodeFailure { address, error });
                    continue;
                }
            };

            match joined {
                Ok(Ok(chunks)) => {
                    debug!(parent: &span, "{} answered with {} chunk(s)", address, chunks);
                }
                Ok(Err(error)) => {
                    warn!(parent: &span, "No contribution from {}: {}", address, error);
                    failures.push(NodeFailure { address, error });
                }
                Err(e) => {
                    warn!(parent: &span, "Query task for {} failed: {}", address, e);
                    let error = NodeQueryError::TaskFailed {
                        address: address.clone(),
                        reason: e.to_string(),
                    };
                    failures.push(NodeFailure { address, error });
                }
            }
        }

        let elapsed = started.elapsed();
        let snapshot = state.snapshot();
        let may_undercount = snapshot.may_undercount(self.total_chunks);

        info!(
            parent: &span,
            "Query finished in {:?}: {} record(s) across {} chunk(s), {} node failure(s)",
            elapsed,
            snapshot.total,
            snapshot.unique_chunks,
            failures.len()
        );

        QueryReport {
            query_id,
            total: snapshot.total,
            unique_chunks: snapshot.unique_chunks,
            elapsed,
            nodes_queried: view.len(),
            failures,
            may_undercount,
            cancelled,
        }
    }
}

/// One node's share of a query: exchange, decode, merge.
async fn query_node(
    transport: &Transport,
    node: &Node,
    frame: &[u8],
    state: &AggregateState,
) -> Result<usize, NodeQueryError> {
    let response = transport.send(node, frame).await?;
    let partial = decode_partial(node.address(), &response)?;
    let chunks = partial.len();
    let counted = state.merge(partial);

    debug!(
        "Merged {} of {} chunk(s) from {}",
        counted,
        chunks,
        node.address()
    );
    Ok(chunks)
}
