//! Mergewatch observability
//!
//! Installs the process-wide `tracing` subscriber used by the `mergewatch`
//! binary. Library crates only emit events through `tracing`; this crate
//! decides where they go and how they look.
//!
//! # Features
//!
//! - **Multiple Output Formats**: Pretty, compact and JSON
//! - **Environment-based Filtering**: `RUST_LOG` is honoured when no level is configured
//! - **Verbosity Flags**: `-v` / `-q` map onto filter levels
//!
//! # Example
//!
//! ```ignore
//! use mergewatch_observability::{init_tracing, LogFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_tracing(LogFormat::Compact, Some("info"))?;
//!     tracing::info!("mergewatch started");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
