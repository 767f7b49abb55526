//! 세션 endpoint.
//!
//! - `POST /login`: 자격증명 → 토큰 페어
//! - `POST /refresh`: refresh 토큰 회전
//! - `POST /logout`: refresh 토큰 폐기
//! - `GET /verify`: access 토큰 검증 결과 (다른 서비스용)

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use authgate_core::gate::authenticate;
use authgate_core::{Principal, Role, TokenPair};

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::metrics::{record_login, record_logout, record_refresh};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email은 비어 있을 수 없습니다"))]
    pub email: String,
    #[validate(length(min = 1, message = "password는 비어 있을 수 없습니다"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: Principal,
}

/// refresh / 로그아웃 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh_token은 비어 있을 수 없습니다"))]
    pub refresh_token: String,
}

/// 단순 메시지 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 토큰 검증 결과.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 로그인.
///
/// POST /api/v1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    match state.sessions.login(&request.email, &request.password).await {
        Ok(outcome) => {
            record_login("success");
            Ok(Json(LoginResponse {
                tokens: outcome.tokens,
                user: outcome.principal,
            }))
        }
        Err(e) => {
            record_login(e.code());
            Err(e.into())
        }
    }
}

/// refresh 토큰으로 새 페어 발급.
///
/// POST /api/v1/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<TokenPair>> {
    match state.sessions.refresh(&request.refresh_token).await {
        Ok(tokens) => {
            record_refresh("success");
            Ok(Json(tokens))
        }
        Err(e) => {
            record_refresh(e.code());
            Err(e.into())
        }
    }
}

/// 로그아웃.
///
/// POST /api/v1/logout
///
/// 이미 폐기되었거나 알 수 없는 토큰도 200을 반환합니다.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> Json<MessageResponse> {
    state.sessions.logout(&request.refresh_token).await;
    record_logout();

    Json(MessageResponse {
        message: "로그아웃되었습니다".to_string(),
    })
}

/// access 토큰 검증.
///
/// GET /api/v1/verify
pub async fn verify(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    match authenticate(state.signer(), header) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                valid: true,
                subject: Some(claims.sub),
                email: Some(claims.email),
                role: Some(claims.role),
                expires_at: DateTime::from_timestamp(claims.exp, 0),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                valid: false,
                subject: None,
                email: None,
                role: None,
                expires_at: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}

/// 세션 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/verify", get(verify))
}
