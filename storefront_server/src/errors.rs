use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use storefront_engine::traits::{CatalogApiError, ContentApiError, OrderApiError, UserStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Unauthorized")]
    AuthenticationRequired,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email is already linked to another account")]
    DuplicateEmail,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Could not complete the sign-in with the external provider. {0}")]
    OauthExchangeFailed(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::OauthExchangeFailed(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::DuplicateUsername => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Login and registration failures keep the `message` envelope that the
        // storefront client renders directly; everything else reports `error`.
        let body = match self {
            Self::InvalidCredentials | Self::DuplicateUsername | Self::DuplicateEmail => {
                serde_json::json!({ "message": self.to_string() })
            },
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

/// Failure modes of bearer-token validation. The authentication middleware
/// never surfaces these to the client; they exist so logs and tests can tell a
/// tampered token apart from a stale one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Bearer token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Bearer token signature is invalid.")]
    BadSignature,
    #[error("Bearer token has expired.")]
    TokenExpired,
}

impl From<UserStoreError> for ServerError {
    fn from(e: UserStoreError) -> Self {
        match e {
            UserStoreError::DuplicateUsername => Self::DuplicateUsername,
            UserStoreError::DuplicateEmail => Self::DuplicateEmail,
            UserStoreError::UserNotFound => Self::NoRecordFound("User not found".to_string()),
            UserStoreError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ProductNotFound => Self::NoRecordFound("Product not found".to_string()),
            CatalogApiError::CategoryNotFound => Self::NoRecordFound("Category not found".to_string()),
            CatalogApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::OrderNotFound => Self::NoRecordFound("Order not found".to_string()),
            OrderApiError::ProductNotFound(id) => Self::InvalidRequestBody(format!("Product {id} does not exist")),
            OrderApiError::EmptyOrder => Self::InvalidRequestBody("Order contains no items".to_string()),
            OrderApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<ContentApiError> for ServerError {
    fn from(e: ContentApiError) -> Self {
        match e {
            ContentApiError::BannerNotFound => Self::NoRecordFound("Banner not found".to_string()),
            ContentApiError::NewsNotFound => Self::NoRecordFound("News article not found".to_string()),
            ContentApiError::ProductNotFound(id) => {
                Self::InvalidRequestBody(format!("Product {id} does not exist"))
            },
            ContentApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
