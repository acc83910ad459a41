//! Command types for the cache protocol.
//!
//! This module defines the commands that can be sent to the cache server.

use crate::error::{CacheError, CacheResult};

/// Types of commands supported by the cache server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key.
    Get,
    /// Set a key-value pair, with an optional TTL in seconds.
    Set,
    /// Delete a key.
    Delete,
    /// Ping the server (health check).
    Ping,
    /// Get server statistics.
    Stats,
    /// Get the tracked byte total.
    Bytes,
    /// Shrink the cache to a byte target.
    Shrink,
    /// Invalid or unknown command.
    Invalid,
}

impl Command {
    /// Parse a command from a string.
    ///
    /// # Arguments
    /// * `s` - The command string (case-insensitive).
    ///
    /// # Returns
    /// The parsed command, or `Command::Invalid` for unknown commands.
    pub fn get(s: &str) -> Command {
        match s.to_lowercase().as_str() {
            "set" => Command::Set,
            "get" => Command::Get,
            "delete" | "del" => Command::Delete,
            "ping" => Command::Ping,
            "stats" | "info" => Command::Stats,
            "bytes" => Command::Bytes,
            "shrink" => Command::Shrink,
            _ => Command::Invalid,
        }
    }

    /// Parse a command from a string, returning an error for invalid commands.
    pub fn parse(s: &str) -> CacheResult<Command> {
        let cmd = Self::get(s);
        if cmd == Command::Invalid {
            Err(CacheError::InvalidCommand(s.to_string()))
        } else {
            Ok(cmd)
        }
    }

    /// Get the string representation of this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Get => "get",
            Command::Set => "set",
            Command::Delete => "delete",
            Command::Ping => "ping",
            Command::Stats => "stats",
            Command::Bytes => "bytes",
            Command::Shrink => "shrink",
            Command::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
