//! chatrelay library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod http;
pub mod inference;
pub mod mcp;

#[cfg(test)]
pub mod test_support;

/// Transport surface the binary serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Surface {
    /// JSON over HTTP (`POST /` with an `action` field)
    #[default]
    Http,
    /// Model Context Protocol over stdin/stdout
    Stdio,
}
