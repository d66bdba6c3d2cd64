//! HTTP-subset protocol implementation.
//!
//! Serves files for a single `GET` request per connection. There is no
//! keep-alive, no request body handling, and only the request line is read.
//!
//! # Architecture
//!
//! - **`connection`**: Drives one connection through read, classify, respond, close
//! - **`parser`**: Classifies the bytes of a request and extracts the resource name
//! - **`request`**: Raw and parsed request types
//! - **`response`**: Status codes, response outcomes and response heads
//! - **`writer`**: Serializes a response and streams file bodies to the client
//! - **`mime`**: Content type detection based on file extensions
//! - **`error`**: The ways a connection can end early
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │  ReadingRequest  │ ← One bounded read, then parse
//!        └──────┬───────────┘
//!               │ Outcome resolved (400 / 404 / 200)
//!               ▼
//!        ┌──────────────────┐
//!        │    Classified    │ ← Write exactly one response
//!        └──────┬───────────┘
//!               │ Response written (or cut short)
//!               ▼
//!        ┌──────────────────┐
//!        │    Responded     │ ← Shut the connection down
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use filegate::http::connection::{Connection, ConnectionOptions};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:7341").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             let conn = Connection::new(socket, ConnectionOptions::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
