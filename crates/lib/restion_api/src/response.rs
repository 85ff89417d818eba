//! Uniform success envelope.
//!
//! Every JSON body leaving the API is either this envelope or the failure
//! envelope rendered by [`crate::error::AppError`].

use axum::Json;
use serde::Serialize;

/// Success envelope: `{"success": true, "message": …, "data": …}`.
///
/// `message` and `data` are omitted from the JSON when absent.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Envelope with a message and a payload.
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }

    /// Envelope with a payload only.
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }
}
