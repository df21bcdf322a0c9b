//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, written to stderr
//! with optional rolling JSON files.

pub mod logger;

pub use logger::LoggerImpl;
