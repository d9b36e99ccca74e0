//! AURA VOX Site API Library
//!
//! This library backs the AURA VOX artist website. It proxies the Spotify,
//! YouTube and Instagram APIs behind a small in-memory expiring cache, keeps
//! the Spotify client-credentials token and the Instagram OAuth token alive,
//! and serves the static artist records the front end renders.
//!
//! # Modules
//!
//! - `api` - HTTP route handlers
//! - `cli` - Command-line subcommands (`serve`, `status`)
//! - `config` - Configuration management and environment variables
//! - `error` - Provider error type shared by all clients
//! - `instagram` - Instagram Graph API client and OAuth flow
//! - `management` - Cache, clock, token and static artist data management
//! - `server` - Router assembly and HTTP server bootstrap
//! - `spotify` - Spotify Web API client
//! - `types` - Provider payloads and normalized records
//! - `utils` - Pure formatting helpers
//! - `youtube` - YouTube Data API client
//!
//! # Example
//!
//! ```
//! use auravox::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> auravox::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env();
//!     let addr = config.server_addr.clone();
//!     server::start_api_server(server::AppState::new(config).into(), &addr).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod instagram;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod youtube;

/// A convenient Result type alias for bootstrap operations that may fail.
///
/// Provider calls use [`error::ProviderError`]; this boxed alias is for the
/// server and CLI glue where any error simply aborts startup.
///
/// # Example
///
/// ```
/// use auravox::Res;
///
/// async fn bind() -> Res<()> {
///     Ok(())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal startup errors. Request-time failures are logged through
/// `tracing` and answered with an HTTP 500 instead.
///
/// # Example
///
/// ```
/// error!("Failed to bind {}: {}", addr, e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("YOUTUBE_API_KEY is not set, video routes will fail");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
