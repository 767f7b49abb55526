//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/login`, `/api/v1/refresh`, `/api/v1/logout` - 세션
//! - `/api/v1/verify` - access 토큰 검증
//! - `/api/v1/me`, `/api/v1/users/{id}` - 사용자 (user, admin)
//! - `/api/v1/admin/stats` - 관리자 통계 (admin)

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

pub use admin::{admin_router, AdminStatsResponse};
pub use auth::{
    auth_router, LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest,
    VerifyResponse,
};
pub use health::{health_router, HealthResponse, RegistryHealth};
pub use users::users_router;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    let v1 = Router::new()
        .merge(auth_router())
        .merge(users_router())
        .merge(admin_router());

    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1", v1)
}
