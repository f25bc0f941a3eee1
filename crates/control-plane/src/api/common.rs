// Common DTOs for public API
//
// These types are shared across multiple API endpoints: the error body,
// the paginated list envelope and its query extractor, and the mapping
// from service errors to HTTP responses.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, OriginalUri, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::ServiceError;

/// Default page number for list endpoints
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page size a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Paginated response envelope for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: i64,
    /// Relative URL of the next page, or null on the last page.
    pub next: Option<String>,
    /// Relative URL of the previous page, or null on the first page.
    pub previous: Option<String>,
    /// Items on this page.
    pub results: Vec<T>,
}

/// Query parameters accepted by paginated list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Validated pagination parameters plus the request path used to build
/// the `next`/`previous` links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    path: String,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64, path: impl Into<String>) -> Result<Self, ServiceError> {
        let page = u32::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| {
                ServiceError::InvalidInput("page must be greater than or equal to 1".to_string())
            })?;
        let page_size = u32::try_from(page_size)
            .ok()
            .filter(|n| (1..=MAX_PAGE_SIZE).contains(&i64::from(*n)))
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "page_size must be between 1 and {}",
                    MAX_PAGE_SIZE
                ))
            })?;

        Ok(Self {
            page,
            page_size,
            path: path.into(),
        })
    }

    /// Wrap one page of results with the total count and neighbour links
    pub fn envelope<T>(&self, results: Vec<T>, count: i64) -> Paginated<T> {
        let page = i64::from(self.page);
        let page_size = i64::from(self.page_size);

        let next = (page * page_size < count).then(|| self.link(page + 1));
        let previous = (page > 1).then(|| self.link(page - 1));

        Paginated {
            count,
            next,
            previous,
            results,
        }
    }

    fn link(&self, page: i64) -> String {
        format!("{}?page={}&page_size={}", self.path, page, self.page_size)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServiceError::InvalidInput(e.body_text()))?;

        // Nested routers strip their prefix from parts.uri; links use the full path
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Pagination::new(query.page, query.page_size, path)
    }
}

/// JSON body extractor whose rejections use the `{"error": ...}` body.
/// Missing content type, bad syntax and schema mismatches all answer 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path extractor with the same error body as [`ApiJson`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::UserNotFound
            | ServiceError::EnvironmentNotFound
            | ServiceError::VariableNotFound => StatusCode::NOT_FOUND,
            ServiceError::DuplicateUsername(_)
            | ServiceError::DuplicateEnvironment(_)
            | ServiceError::DuplicateVariable(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServiceError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        ErrorResponse::new(message).into_response(status).into_response()
    }
}
