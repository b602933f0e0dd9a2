//! Client core for the cinema app.
//!
//! - [`client`]: HTTP client that attaches the stored bearer credential to
//!   every outbound request.
//! - [`storage`]: key-value stores the credential is read from.
//! - [`annotations`]: comment list and input buffer for a movie detail view.

pub mod annotations;
pub mod client;
pub mod config;
pub mod models;
pub mod storage;

pub use annotations::{AnnotationStore, BufferState};
pub use client::{ApiClient, ClientError};
pub use config::ClientConfig;
