//! HTTP/1.0 request handling.
//!
//! One connection carries exactly one request and one response.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine driving the exchange
//! - **`parser`**: Extracts method and URI from the request line
//! - **`request`**: Parsed request and known methods
//! - **`resolver`**: Maps URIs onto files under the resource root
//! - **`response`**: Status codes and the status/body decision
//! - **`writer`**: Serialises the response head and streams file bodies
//! - **`error`**: Failures that end a connection
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read up to the end of the request head
//!        └──────┬──────┘
//!               │ Request line parsed (or not)
//!               ▼
//!        ┌──────────────────┐
//!        │    Received      │ ← Resolve the resource for GET/HEAD
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │  StatusDecided   │ ← Write status line, headers, blank line
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │   HeadersSent    │ ← Stream the file for 200 GET
//!        └──────┬───────────┘
//!               ▼
//!             Done → connection closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minihttpd::config::Config;
//! use minihttpd::http::connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::load());
//!     let listener = TcpListener::bind(config.listen_addr()).await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(connection::handle(socket, Arc::clone(&config)));
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod response;
pub mod writer;
