//! 요청 파이프라인 게이트.
//!
//! - 인증: `Authorization: Bearer <token>` 헤더 → 검증된 [`AccessClaims`]
//! - 인가: 역할 허용 목록(RBAC) → 주체 일치 또는 전체 접근 역할(ABAC)
//!
//! 모두 I/O가 없는 순수 함수입니다. 인증 게이트는 레지스트리를 조회하지 않으므로
//! access 토큰은 자연 만료 전까지 폐기할 수 없습니다.

use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::principal::Role;
use crate::token::{AccessClaims, TokenSigner};

/// Bearer 스킴 접두사.
pub const BEARER_PREFIX: &str = "Bearer ";

/// 일반 보호 엔드포인트에 허용되는 역할.
pub const MEMBER_ROLES: &[Role] = &[Role::User, Role::Admin];

/// 관리자 전용 엔드포인트에 허용되는 역할.
pub const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// Authorization 헤더 값에서 토큰 추출.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthorized)
}

/// 인증 게이트.
///
/// 헤더 누락, 스킴 오류, 파싱 실패, refresh 토큰 사용은 모두 `Unauthorized`입니다.
pub fn authenticate(signer: &TokenSigner, header: Option<&str>) -> AuthResult<AccessClaims> {
    let token = bearer_token(header)?;
    signer.parse_access(token).map_err(|e| {
        debug!(reason = %e, "Bearer authentication failed");
        AuthError::Unauthorized
    })
}

/// RBAC: 역할이 허용 목록에 있어야 함.
pub fn require_role(claims: &AccessClaims, allowed: &[Role]) -> AuthResult<()> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        debug!(user_id = claims.sub, role = %claims.role, "Role not allowed");
        Err(AuthError::Forbidden)
    }
}

/// ABAC: 요청 주체가 리소스 주인이거나 전체 접근 역할이어야 함.
pub fn require_subject(claims: &AccessClaims, resource_id: i64) -> AuthResult<()> {
    if claims.sub == resource_id || claims.role.has_universal_access() {
        Ok(())
    } else {
        debug!(
            user_id = claims.sub,
            resource_id, "Access to another user's resource denied"
        );
        Err(AuthError::Forbidden)
    }
}
