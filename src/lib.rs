//! shorturl - URL shortener core
//!
//! Maps long URLs to base62 short codes and back, over either an in-memory
//! store (with an optional JSON snapshot) or a relational database, with
//! per-user ownership and batched asynchronous soft deletion.
//!
//! # Architecture
//! - `utils`: base62 codec and input validation
//! - `storage`: the `UrlStorage` trait plus cache and database engines
//! - `services`: the shortening engine and its deletion queue
//! - `config`: static configuration (TOML + environment)
//! - `system`: logging and shutdown plumbing

pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

pub use errors::{Result, ShortenerError};
pub use services::Shortener;
