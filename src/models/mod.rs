//! Wire-level models shared by the client and its transports.
//!
//! - [`OutboundRequest`]: a request descriptor owned by the caller until it is
//!   handed to a transport. The auth step may add an `Authorization` header and
//!   nothing else.
//! - [`ApiResponse`]: whatever the transport received, regardless of status.

mod request;
mod response;

pub use request::*;
pub use response::*;
