//! Node Transport Module
//!
//! Request/response exchange with a single storage node over its persistent TCP
//! connection. Every I/O problem is surfaced as a per-node `TransportError`; nothing
//! here can take the process down.
//!
//! ## Core Mechanisms
//! - **Framing**: Length-prefixed frames by default. The legacy raw mode (one bare
//!   write, one bounded read) is kept for nodes that predate framing, and reports a
//!   full buffer as a possible truncation instead of using it silently.
//! - **Deadlines**: Each exchange runs under a per-call timeout. Expiry is a normal
//!   per-node failure.
//! - **Exclusive use**: A connection serves one exchange at a time, so an admin opcode
//!   and a query never interleave bytes on the same stream.
//! - **Poisoning**: After a failed exchange the stream state is unknown; the connection
//!   is marked dead and every later exchange fails fast. There is no reconnection.

pub mod connection;
pub mod framing;

pub use connection::{Connection, Transport};
pub use framing::Framing;
