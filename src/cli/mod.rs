//! ai-services CLI invocation and output parsing.

mod client;
mod parse;
mod process;

pub use client::*;
pub use parse::*;
pub use process::*;
