//! Configuration module
//!
//! Output settings shared by every command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}
