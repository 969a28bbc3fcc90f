//! minihttpd - Minimal concurrent HTTP/1.0 file server
//!
//! Serves files from a resource root, one task per connection.

pub mod config;
pub mod http;
pub mod server;
