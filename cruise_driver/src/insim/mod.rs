//! InSim v9 over TCP
//!
//! - `packet`: framing, decoding of the packets the regulator reacts to,
//!   encoding of the packets it sends
//! - `session`: one connection from handshake to close

pub mod packet;
pub mod session;

pub use packet::Packet;
pub use session::{translate, Session, SessionEnd};
