pub mod cache;
pub mod client;

pub use cache::DocumentCache;
pub use client::{sha1_hex, with_retry, DocumentFetcher, HttpFetcher};
