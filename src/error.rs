//! Error taxonomy for the client.
//!
//! Per-node failures (`TransportError`, `NodeQueryError`) are values the query
//! path absorbs; `RegistryError::NoReachableNodes` is the only condition the
//! binary treats as fatal.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single request/response exchange with one storage node.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {source}")]
    ConnectFailed {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("connecting to {address} timed out after {timeout:?}")]
    ConnectTimeout { address: String, timeout: Duration },

    #[error("cannot send request to {address}: {source}")]
    SendFailed {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("no response received from {address}: {source}")]
    ReceiveFailed {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("{address} did not answer within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("connection to {address} is closed")]
    ConnectionClosed { address: String },

    #[error("frame of {len} bytes from {address} exceeds the {max}-byte limit")]
    FrameTooLarge {
        address: String,
        len: usize,
        max: usize,
    },

    #[error("response from {address} filled the {capacity}-byte buffer and may be truncated")]
    ResponseTruncated { address: String, capacity: usize },
}

impl TransportError {
    /// Address of the node the failed exchange targeted.
    pub fn address(&self) -> &str {
        match self {
            Self::ConnectFailed { address, .. }
            | Self::ConnectTimeout { address, .. }
            | Self::SendFailed { address, .. }
            | Self::ReceiveFailed { address, .. }
            | Self::Timeout { address, .. }
            | Self::ConnectionClosed { address }
            | Self::FrameTooLarge { address, .. }
            | Self::ResponseTruncated { address, .. } => address,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no storage server reachable among {attempted} configured address(es)")]
    NoReachableNodes { attempted: usize },
}

/// Why one node contributed nothing to a query.
#[derive(Debug, Error)]
pub enum NodeQueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("undecodable response from {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("query task for {address} did not complete: {reason}")]
    TaskFailed { address: String, reason: String },

    #[error("query cancelled before {address} answered")]
    Cancelled { address: String },
}

/// Rejected user input. Never reaches the network.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("author name is empty")]
    EmptyAuthor,

    #[error("author name must not contain '{ch}'")]
    ReservedCharacter { ch: char },

    #[error("time range '{input}' is not of the form [start,end]")]
    MalformedRange { input: String },

    #[error("'{value}' is not a valid year")]
    NonNumericYear { value: String },

    #[error("time range starts at {start} but ends at {end}")]
    InvertedRange { start: i32, end: i32 },
}

/// Failure injection refused because it would leave too few servers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("only {current} server(s) connected, more than {minimum} are required to drop one")]
pub struct QuorumError {
    pub current: usize,
    pub minimum: usize,
}

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("no coordinating node is connected")]
    NoCoordinator,

    #[error("'{0}' is not a valid ip:port address")]
    InvalidAddress(String),

    #[error("{0} is already part of the cluster view")]
    AlreadyPresent(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("flag {0} requires a value")]
    MissingValue(String),

    #[error("unknown argument: {0}")]
    UnknownFlag(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("no storage node addresses configured")]
    NoNodes,
}
