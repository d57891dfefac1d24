//! Query/mutation layer
//!
//! Caching, staleness, request deduplication, retry and invalidation for
//! the service calls.

mod client;
mod key;
mod retry;

pub use client::{QueryClient, QueryOptions};
pub use key::QueryKey;
pub use retry::RetryPolicy;
