pub mod backend;
pub mod client;
pub mod types;

pub use backend::{Backend, BackendError, CacheClearOutcome, clear_and_refresh, fetch_status};
pub use client::{DEFAULT_BACKEND_URL, HttpBackend};
pub use types::{AiStats, CacheSnapshot, HealthSnapshot, QueryResponse};
