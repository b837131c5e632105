//! Model Context Protocol surface over the ai-services tools.

mod protocol;
mod server;
mod tools;

pub use protocol::*;
pub use server::*;
pub use tools::*;
