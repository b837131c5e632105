//! ai-services MCP - tool adapters for the ai-services CLI, a chat
//! completions API and a reference documents API.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod reference;
