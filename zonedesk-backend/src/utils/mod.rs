//! Utility modules.

/// Log sanitization utilities to keep large record payloads out of logs.
pub mod log_sanitizer;

/// SOA serial arithmetic.
pub mod serial;
