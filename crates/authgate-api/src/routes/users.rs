//! 사용자 endpoint.
//!
//! - `GET /me`: 토큰 주체 정보
//! - `GET /users/{id}`: 본인 또는 admin만 조회 가능

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use authgate_core::gate::require_subject;
use authgate_core::{AuthError, Principal};

use crate::auth::MemberAuth;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 내 정보.
///
/// GET /api/v1/me
pub async fn me(MemberAuth(claims): MemberAuth) -> Json<Principal> {
    Json(claims.principal())
}

/// 사용자 조회.
///
/// GET /api/v1/users/{id}
///
/// 소유권 검사가 디렉터리 조회보다 먼저 수행되므로, 권한 없는 요청자는
/// 대상 사용자의 존재 여부를 알 수 없습니다.
pub async fn get_user(
    MemberAuth(claims): MemberAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Principal>> {
    let id: i64 = id.parse().map_err(|_| ApiError::from(AuthError::InvalidUserId))?;
    require_subject(&claims, id)?;

    match state.directory().user_by_id(id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            debug!(user_id = id, "User lookup found nothing");
            Err(ApiError::user_not_found())
        }
    }
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/users/{id}", get(get_user))
}
