//! Chat completions: request payloads, event-stream decoding and the client.

mod client;
mod stream;
mod types;

pub use client::*;
pub use stream::*;
pub use types::*;
