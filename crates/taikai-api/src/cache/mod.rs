//! Response caching for upstream lookups.
//!
//! The in-process tier is authoritative: entries invalidate on TTL expiry or
//! version mismatch. `Cache-Control` headers let CDNs skip the route handler
//! entirely, and the browser keeps its own versioned copy; both of those
//! tiers are performance hints layered on top, never correctness-bearing.

pub mod headers;
mod memory;

pub use memory::ResponseCache;
