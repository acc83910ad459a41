//! membound cache server.
//!
//! This binary runs a TCP server that accepts cache commands from clients.
//! When a memory limit is configured, it starts the background eviction task
//! so the cache stays under budget independently of request traffic.

use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    signal,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use membound::{buffer_to_array, Cache, CacheConfig, Command};

/// Server configuration with defaults.
struct ServerConfig {
    host: String,
    port: u16,
    /// Memory budget for cached payload bytes; `None` disables background
    /// eviction.
    memory_limit: Option<u64>,
    /// How often the background task checks the budget.
    eviction_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            memory_limit: Some(64 * 1024 * 1024),
            eviction_interval: Duration::from_secs(5),
        }
    }
}

/// Entry point for the cache server.
#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "membound=info,server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::default();

    let cache_config = CacheConfig::new()
        .max_bytes(config.memory_limit.unwrap_or(0))
        .eviction_interval(config.eviction_interval)
        .build();

    // Create the shared cache
    let cache = Arc::new(Cache::new(cache_config.clone()));

    // Background eviction keeps the byte total under budget between requests
    if let Some(limit) = cache_config.get_max_bytes() {
        cache.start_eviction(limit, cache_config.get_eviction_interval())?;
    }

    // Bind the listener
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, memory_limit = ?config.memory_limit, "cache server listening");

    // Spawn a task to handle graceful shutdown
    let shutdown_cache = Arc::clone(&cache);
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            shutdown_cache.stop_eviction();
            let stats = shutdown_cache.stats();
            info!(
                hits = stats.hits,
                misses = stats.misses,
                entries = stats.entries,
                bytes = stats.bytes_referenced,
                "shutting down"
            );
            std::process::exit(0);
        }
    });

    // Accept connections in a loop
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                info!(%peer, "connection accepted");

                // Clone the cache handle for this connection
                let cache = Arc::clone(&cache);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, cache).await {
                        error!(%peer, "connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    mut socket: TcpStream,
    cache: Arc<Cache>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = BytesMut::with_capacity(1024);

    // Read the request
    let n = socket.read_buf(&mut buf).await?;
    if n == 0 {
        return Ok(()); // Connection closed
    }

    // Parse the command
    let attrs = buffer_to_array(&mut buf);

    if attrs.is_empty() {
        socket.write_all(b"ERR empty command").await?;
        return Ok(());
    }

    let command = Command::get(&attrs[0]);

    // Process the command
    let response = process_command(command, &attrs, &cache);

    // Send the response
    socket.write_all(response.as_bytes()).await?;

    Ok(())
}

/// Process a cache command and return the response.
fn process_command(command: Command, attrs: &[String], cache: &Cache) -> String {
    match command {
        Command::Get => {
            if attrs.len() < 2 {
                return "ERR missing key argument".to_string();
            }

            let key = &attrs[1];
            match cache.get(key) {
                Some(value) => match std::str::from_utf8(&value) {
                    Ok(s) => s.to_string(),
                    Err(_) => format!("(binary data: {} bytes)", value.len()),
                },
                None => String::new(), // Empty string for absent (missing or expired)
            }
        }

        Command::Set => {
            if attrs.len() < 3 {
                return "ERR missing key or value argument".to_string();
            }

            let key = &attrs[1];
            let value = &attrs[2];

            // Optional fourth word: TTL in seconds
            let ttl = match attrs.get(3).map(|s| s.parse::<u64>()) {
                Some(Ok(secs)) => Some(Duration::from_secs(secs)),
                Some(Err(_)) => return "ERR invalid ttl argument".to_string(),
                None => None,
            };

            let existed = cache.contains(key);
            match ttl {
                Some(ttl) => cache.set_with_ttl(key.clone(), value.clone(), ttl),
                None => cache.set(key.clone(), value.clone()),
            }

            if existed {
                "r Ok".to_string() // Replaced
            } else {
                "Ok".to_string() // New key
            }
        }

        Command::Delete => {
            if attrs.len() < 2 {
                return "ERR missing key argument".to_string();
            }

            let key = &attrs[1];
            if cache.delete(key) {
                "Ok".to_string()
            } else {
                String::new() // Not found
            }
        }

        Command::Ping => "PONG".to_string(),

        Command::Stats => {
            let stats = cache.stats();
            format!(
                "hits:{} misses:{} evictions:{} expirations:{} entries:{} bytes:{} hit_rate:{:.1}%",
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.expirations,
                stats.entries,
                stats.bytes_referenced,
                stats.hit_rate
            )
        }

        Command::Bytes => cache.bytes_referenced().to_string(),

        Command::Shrink => {
            if attrs.len() < 2 {
                return "ERR missing target argument".to_string();
            }

            match attrs[1].parse::<u64>() {
                Ok(target) => {
                    let evicted = cache.shrink_to(target);
                    format!("evicted {}", evicted)
                }
                Err(_) => "ERR invalid target argument".to_string(),
            }
        }

        Command::Invalid => {
            format!(
                "ERR unknown command '{}'",
                attrs.first().unwrap_or(&String::new())
            )
        }
    }
}
