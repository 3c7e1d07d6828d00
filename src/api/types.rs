//! Shared types for the API layer.

use std::sync::Arc;

use crate::insight::InsightProxy;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub proxy: Arc<InsightProxy>,
}

impl ApiContext {
    pub fn new(proxy: Arc<InsightProxy>) -> Self {
        Self { proxy }
    }
}
