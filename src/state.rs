//! Shared application state for the admin routes.

use crate::config::DEFAULT_BODY_LIMIT;
use crate::service::AdminService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AdminService>,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl AppState {
    pub fn new(service: AdminService) -> Self {
        AppState {
            service: Arc::new(service),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}
