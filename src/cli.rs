//! Command-line interface definitions.
//!
//! This module defines the CLI structure for the cache client using clap.

use clap::{Parser, Subcommand};

/// membound cache client.
///
/// A CLI tool for interacting with the membound cache server.
#[derive(Parser, Debug)]
#[command(name = "membound-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The command to execute.
    #[clap(subcommand)]
    pub command: ClientCommand,
}

/// Available client commands.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Get a value by key.
    ///
    /// Retrieves the value stored at the given key.
    /// Returns nothing if the key doesn't exist or has expired.
    Get {
        /// The key to look up.
        key: String,
    },

    /// Set a key-value pair.
    ///
    /// Stores the value at the given key. If the key already
    /// exists, its value is updated.
    Set {
        /// The key to store the value under.
        key: String,
        /// The value to store.
        value: String,
        /// Optional TTL in seconds; the entry expires this far from now.
        #[clap(long)]
        ttl: Option<u64>,
    },

    /// Delete a key.
    ///
    /// Removes the key and its value from the cache.
    Delete {
        /// The key to delete.
        key: String,
    },

    /// Ping the server.
    ///
    /// Checks if the server is running and responsive.
    Ping,

    /// Get server statistics.
    ///
    /// Shows cache hits, misses, entry count, byte total, and hit rate.
    Stats,

    /// Get the byte total currently referenced by the cache.
    Bytes,

    /// Shrink the cache to a byte target, evicting LRU entries.
    Shrink {
        /// Target byte total.
        target: u64,
    },
}
