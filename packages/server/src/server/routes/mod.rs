// HTTP routes
mod health;
mod jobs;

pub use health::health_handler;
pub use jobs::{create_job_handler, get_job_handler};

use serde::Serialize;

/// Standard error body for client-facing failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
