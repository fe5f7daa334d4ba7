//! Notabene is the assistant core a note editor embeds to offer AI chat with
//! tool calling backed by remote MCP (Model Context Protocol) servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`mcp`] owns the protocol session, tool discovery and invocation,
//!   access policy, and the tool-list cache.
//! - [`api`] defines the assistant-facing chat tool payloads exchanged with
//!   LLM APIs.
//! - [`core`] holds the typed MCP configuration and its parsing from host
//!   settings.
//! - [`host`] is the thin surface the editor host calls into; it reloads the
//!   configuration wholesale on every call and never persists anything.
//!
//! The editor host, its document model, chat UI, and settings storage are
//! external collaborators; this crate only reads the documented settings keys
//! and returns plain data the host can render.

pub mod api;
pub mod core;
pub mod host;
pub mod logging;
pub mod mcp;
