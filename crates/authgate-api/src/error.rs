//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 같은 형식의 JSON 에러를 반환합니다.
//!
//! ```json
//! {
//!   "code": "token_revoked",
//!   "message": "폐기된 토큰입니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use authgate_core::AuthError;

/// 내부 에러일 때 클라이언트에 보내는 메시지.
const INTERNAL_ERROR_MESSAGE: &str = "내부 서버 에러가 발생했습니다";

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "invalid_credentials", "forbidden")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프를 포함한 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러 에러.
///
/// 상태 코드와 응답 본문을 함께 들고 다니며 `IntoResponse`로 렌더링됩니다.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status}: {body}")]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse::new(code, message),
        }
    }

    /// 400 invalid_request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AuthError::InvalidRequest(message.into()).into()
    }

    /// `/users/{id}` 조회 대상이 없을 때의 404.
    ///
    /// refresh 경로의 `UserNotFound`(401)와 코드는 같고 상태만 다릅니다.
    pub fn user_not_found() -> Self {
        let err = AuthError::UserNotFound;
        Self::new(StatusCode::NOT_FOUND, err.code(), err.to_string())
    }

    pub fn code(&self) -> &str {
        &self.body.code
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_internal() {
            error!(error = %err, "Internal error while handling request");
            return Self::new(status, err.code(), INTERNAL_ERROR_MESSAGE);
        }

        Self::new(status, err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("forbidden", "권한이 부족합니다");
        assert_eq!(error.code, "forbidden");
        assert!(error.timestamp.is_some());
    }

    #[test]
    fn test_json_serialization_simple() {
        let error = ApiErrorResponse::simple("unauthorized", "인증이 필요합니다");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("timestamp"));
        assert!(json.contains(r#""code":"unauthorized""#));
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST, "invalid_request"),
            (AuthError::InvalidUserId, StatusCode::BAD_REQUEST, "invalid_user_id"),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "invalid_credentials"),
            (AuthError::TokenExpired, StatusCode::UNAUTHORIZED, "invalid_token"),
            (AuthError::TokenRevoked, StatusCode::UNAUTHORIZED, "token_revoked"),
            (AuthError::WrongTokenPurpose, StatusCode::UNAUTHORIZED, "invalid_token_type"),
            (AuthError::UserNotFound, StatusCode::UNAUTHORIZED, "user_not_found"),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
            (AuthError::Forbidden, StatusCode::FORBIDDEN, "forbidden"),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let api: ApiError = AuthError::Internal("directory connection refused".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.code(), "internal_error");
        assert_eq!(api.body.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_user_not_found_on_lookup_is_404() {
        let api = ApiError::user_not_found();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.code(), "user_not_found");
    }
}
