//! SmartSearch-RS: a hardened search router written in Rust
//!
//! Routes a free-text query to the search engine best suited to it
//! (answer-oriented engines for questions, general-purpose engines for
//! keyword phrases) behind a hardened HTTP boundary: input sanitization,
//! destination allow-listing, abuse-rate limiting, and response header
//! hardening.

pub mod assets;
pub mod config;
pub mod engines;
pub mod geo;
pub mod limiter;
pub mod query;
pub mod redirect;
pub mod web;

pub use config::Settings;
pub use engines::EngineName;
pub use query::QueryIntent;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum accepted query length in characters
pub const MAX_QUERY_LEN: usize = 1000;
