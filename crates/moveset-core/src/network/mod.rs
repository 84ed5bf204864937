//! HTTP transport with retry.

mod client;

pub use client::{HttpClient, parse_url};
