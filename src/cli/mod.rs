//! # CLI Module
//!
//! Subcommands of the `auravox` binary. Each one receives the configuration
//! loaded by `main` and reports to the terminal through the crate's colored
//! output macros (`info!`, `success!`, `warning!`, `error!`).
//!
//! ## Commands
//!
//! - [`serve`] - Runs the HTTP API until stopped
//! - [`status`] - Probes Spotify, YouTube and Instagram once and prints a table
//!
//! Shell completions are generated directly in `main` with `clap_complete`.
//!
//! ## Usage
//!
//! ```bash
//! auravox serve                     # bind SERVER_ADDRESS (default 0.0.0.0:5000)
//! auravox serve --addr 127.0.0.1:8080
//! auravox status                    # check credentials and reachability
//! auravox completions zsh > _auravox
//! ```

mod serve;
mod status;

pub use serve::missing_credentials;
pub use serve::serve;
pub use status::status;
