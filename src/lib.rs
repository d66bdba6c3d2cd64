//! Filegate - minimal HTTP-subset file server
//!
//! Answers a single `GET /<file> HTTP/x.y` request per connection with the
//! file's contents, a 404, or a 400.

pub mod config;
pub mod http;
pub mod server;
