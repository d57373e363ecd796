//! Administrative Wire Protocol
//!
//! Text opcodes sent to the coordinating node. The nodes run their own group-membership
//! protocol; the client only asks for the current list or announces a leave/rejoin.

use std::fmt;

pub const OPCODE_LIST_MEMBERS: &str = "2";
pub const OPCODE_LEAVE: &str = "3";
pub const OPCODE_REJOIN: &str = "4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRequest {
    /// Answered with the node's view of the group as free text.
    ListMembers,
    /// No reply is read.
    Leave { address: String },
    /// No reply is read.
    Rejoin { address: String },
}

impl AdminRequest {
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for AdminRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListMembers => write!(f, "{}", OPCODE_LIST_MEMBERS),
            Self::Leave { address } => write!(f, "{};{}", OPCODE_LEAVE, address),
            Self::Rejoin { address } => write!(f, "{};{}", OPCODE_REJOIN, address),
        }
    }
}

/// Checks that `address` looks like `host:port` before it goes into an opcode.
pub fn parse_member_address(address: &str) -> Option<String> {
    let address = address.trim();
    let (host, port) = address.rsplit_once(':')?;
    if host.is_empty() || host.contains(';') || host.chars().any(char::is_whitespace) {
        return None;
    }
    port.parse::<u16>().ok()?;
    Some(address.to_string())
}
