//! ScholarNet Common Library
//!
//! Shared code for all ScholarNet crates including:
//! - Data model for publications, authors and prediction results
//! - Author name normalization
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod names;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of rows in the top influential authors table
pub const DEFAULT_TOP_N: usize = 20;
