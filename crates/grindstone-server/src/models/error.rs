//! Error body

use serde::Serialize;
use utoipa::ToSchema;

/// Returned with every non-2xx status
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable kind, e.g. `insufficient_funds`
    pub kind: String,
    pub message: String,
}
