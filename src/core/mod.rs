//! # Core Relay Logic
//!
//! Everything both surfaces share. Nothing in here knows about HTTP or
//! JSON-RPC framing.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │                         │
//!                    │  • Action (routing)     │
//!                    │  • relay (chat/analyze) │
//!                    │  • catalog / tools      │
//!                    │  • config               │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    HTTP    │              │   stdio    │
//!           │  Adapter   │              │  (MCP)     │
//!           │  (axum)    │              │            │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`action`]: The `Action` enum, resolved from action or tool names
//! - [`relay`]: The chat and analysis relays
//! - [`catalog`]: Static action list for the HTTP surface
//! - [`tools`]: Tool definitions and execution for the stdio surface
//! - [`config`]: Config file, env and CLI resolution

pub mod action;
pub mod catalog;
pub mod config;
pub mod relay;
pub mod tools;
