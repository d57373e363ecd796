//! Query Wire Protocol
//!
//! A query is a single text frame `0;{author};{yearStart};{yearEnd}`. Empty year fields
//! mean no time filter. The node answers with a JSON object mapping chunk identifiers
//! to match counts, e.g. `{"storage/dblp_12.xml": 5}`.

use super::types::{PartialResult, QueryRequest, YearRange};
use crate::error::NodeQueryError;

pub const OPCODE_QUERY: &str = "0";

pub fn encode_query(request: &QueryRequest) -> Vec<u8> {
    let (start, end) = match request.years() {
        YearRange::Any => (String::new(), String::new()),
        YearRange::Between { start, end } => (start.to_string(), end.to_string()),
    };
    format!("{};{};{};{}", OPCODE_QUERY, request.author(), start, end).into_bytes()
}

/// Decodes one node's answer. Negative or fractional counts are rejected.
pub fn decode_partial(address: &str, response: &[u8]) -> Result<PartialResult, NodeQueryError> {
    serde_json::from_slice(response).map_err(|source| NodeQueryError::Decode {
        address: address.to_string(),
        source,
    })
}
