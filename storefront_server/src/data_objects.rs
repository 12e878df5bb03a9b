//! Request and response payloads that exist only at the HTTP boundary.

use serde::{Deserialize, Serialize};
use storefront_engine::db_types::OrderStatusType;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateParams {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OauthCallbackParams {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}
