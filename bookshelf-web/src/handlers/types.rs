//! Response types shared by all handlers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope around every JSON response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[schema(example = "OK")]
    pub message: String,
    /// Error details on failure
    pub errors: Option<Vec<String>>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            errors: None,
            data: Some(data),
        }
    }

    /// Failure envelope. Multi-line details are split into separate entries.
    pub fn failure(message: &str, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            errors: Some(
                errors
                    .iter()
                    .flat_map(|e| e.split('\n'))
                    .map(str::to_string)
                    .collect(),
            ),
            data: None,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}
