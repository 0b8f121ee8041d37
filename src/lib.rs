//! Echo MCP server.
//!
//! A reference Model Context Protocol server exposing three echo tools
//! (`echo_message`, `echo_with_delay`, `echo_json`) and a health endpoint over
//! HTTP and STDIO.

pub mod core;
pub mod tools;
