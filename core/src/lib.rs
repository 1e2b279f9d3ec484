//! otsake-core - Core types for otsake header enrichment
//!
//! - [`Message`] - payload plus typed header mapping (zero-copy payload)
//! - [`HeaderValue`] - string, number or boolean header value
//! - [`PluginError`] - error type shared by pipeline components

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(missing_docs)]

mod error;
/// Typed header values
pub mod header;
/// The message envelope
pub mod message;

pub use error::PluginError;
pub use header::{HeaderValue, Headers};
pub use message::{Message, MessageId};
