//! Axum용 인증/인가 추출기.
//!
//! 핸들러 인자로 선언하면 요청 처리 전에 Bearer 인증과 역할 검사가 수행되고,
//! 검증된 클레임이 핸들러에 명시적으로 전달됩니다.
//!
//! ```rust,ignore
//! async fn me(MemberAuth(claims): MemberAuth) -> impl IntoResponse {
//!     Json(claims.principal())
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use authgate_core::gate::{authenticate, require_role, ADMIN_ROLES, MEMBER_ROLES};
use authgate_core::AccessClaims;

use crate::error::ApiError;
use crate::state::AppState;

/// Authorization 헤더 값 (없거나 ASCII가 아니면 None).
pub(crate) fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
}

/// Bearer access 토큰 인증 추출기.
#[derive(Debug, Clone)]
pub struct JwtAuth(pub AccessClaims);

impl<S> FromRequestParts<S> for JwtAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = Arc::<AppState>::from_ref(state);
        let claims = authenticate(app.signer(), authorization_header(parts))?;
        Ok(JwtAuth(claims))
    }
}

/// user 또는 admin 역할을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct MemberAuth(pub AccessClaims);

impl<S> FromRequestParts<S> for MemberAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state).await?;
        require_role(&claims, MEMBER_ROLES)?;
        Ok(MemberAuth(claims))
    }
}

/// Admin 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AccessClaims);

impl<S> FromRequestParts<S> for AdminAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state).await?;
        require_role(&claims, ADMIN_ROLES)?;
        Ok(AdminAuth(claims))
    }
}
