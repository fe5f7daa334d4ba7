//! MCP (Model Context Protocol) integration.
//!
//! The layer is composed leaf-first: [`policy`] decides whether a tool may
//! run, [`cache`] keeps the discovered tool list for a bounded time,
//! [`adapter`] translates protocol tool schemas into the assistant's
//! function-calling format, [`client`] owns one network session, and
//! [`orchestrator`] wires the four together into the two operations the host
//! needs. A misbehaving remote server can cost the user a tool listing, never
//! the chat itself.

pub mod adapter;
pub mod cache;
pub mod client;
pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod transport;
