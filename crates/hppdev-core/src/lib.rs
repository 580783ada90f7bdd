//! hppdev core - Shared functionality for hppdev tools
//!
//! Standard locations and user configuration for scaffolding HPP packages.

pub mod config;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
