//! Membership Control Module
//!
//! Administrative operations on the storage group plus local fault injection.
//!
//! ## Operations
//! - **List / Leave / Rejoin**: Text opcodes sent to the coordinating node (the first node
//!   of the current view). Leave and rejoin are fire-and-forget.
//! - **Failure injection**: Drops the connection to a random node and removes it from the
//!   view, modelling an unannounced crash. Refused while the view holds `MIN_QUORUM` nodes
//!   or fewer.
//! - **Reconnect**: Opens a fresh connection to a rejoined address and appends it to the view.

pub mod controller;
pub mod protocol;

pub use controller::{MIN_QUORUM, MembershipController};
