//! Insight HTTP API.
//!
//! Exposes the insight proxy to the portal as JSON endpoints nested under
//! `/api/`. The router is composable: `insight_api_router()` returns a
//! `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::insight_api_router;
pub use server::{start_insight_server, InsightServer, ServerSession};
pub use types::ApiContext;
