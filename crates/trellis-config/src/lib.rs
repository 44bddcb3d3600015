//! Typed configuration for Trellis.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults, then file, then env)
//!
//! # Example
//!
//! ```no_run
//! use trellis_config::ConfigLoader;
//!
//! # fn main() -> Result<(), trellis_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("trellis.toml")?
//!     .with_env_prefix("TRELLIS")
//!     .load()?;
//!
//! println!("ignore trailing slash: {}", config.router.ignore_trailing_slash);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! ignore_trailing_slash = true
//! use_escaped_path = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//! service_name = "edge"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `TRELLIS__ROUTER__IGNORE_TRAILING_SLASH=true`
//! - `TRELLIS__ROUTER__USE_ESCAPED_PATH=false`
//! - `TRELLIS__LOGGING__LEVEL=trellis=debug`
//! - `TRELLIS__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::TrellisConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, RouterConfig};
