//! 인증 서브시스템의 에러 타입.
//!
//! 모든 에러는 요청 경계에서 안정적인 코드와 HTTP 상태로 변환됩니다.
//! 이 크레이트는 HTTP 의존성이 없으므로 상태 코드는 `u16`으로만 노출합니다.

use thiserror::Error;

/// 인증/세션 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 요청 본문이 잘못됨
    #[error("잘못된 요청: {0}")]
    InvalidRequest(String),

    /// 경로의 사용자 ID 형식이 잘못됨
    #[error("잘못된 사용자 ID 형식")]
    InvalidUserId,

    /// 로그인 실패 (알 수 없는 이메일과 잘못된 비밀번호를 구분하지 않음)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 토큰 구조 또는 클레임이 잘못됨
    #[error("잘못된 토큰 형식")]
    TokenMalformed,

    /// 토큰 만료
    #[error("토큰이 만료되었습니다")]
    TokenExpired,

    /// 서명 검증 실패
    #[error("토큰 서명이 유효하지 않습니다")]
    TokenBadSignature,

    /// 레지스트리에서 폐기(또는 미등록/만료)된 refresh 토큰
    #[error("폐기된 토큰입니다")]
    TokenRevoked,

    /// access 토큰 자리에 refresh 토큰이 쓰였거나 그 반대
    #[error("토큰 용도가 올바르지 않습니다")]
    WrongTokenPurpose,

    /// 사용자 없음
    #[error("사용자를 찾을 수 없습니다")]
    UserNotFound,

    /// Bearer 인증 실패
    #[error("인증이 필요합니다")]
    Unauthorized,

    /// 역할 또는 소유권 불일치
    #[error("권한이 부족합니다")]
    Forbidden,

    /// 토큰 서명 실패
    #[error("토큰 생성 실패: {0}")]
    TokenCreation(String),

    /// 비밀번호 해싱 실패
    #[error("비밀번호 해싱 실패")]
    Hashing,

    /// 사용자 디렉터리 등 내부 협력자 실패
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 시작 시점 설정 에러 (치명적)
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 인증 작업을 위한 Result 타입.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// 클라이언트에 노출되는 기계 판독용 에러 코드.
    ///
    /// 파싱 단계의 토큰 에러는 모두 `invalid_token`으로 합쳐집니다.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::InvalidUserId => "invalid_user_id",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenMalformed | AuthError::TokenExpired | AuthError::TokenBadSignature => {
                "invalid_token"
            }
            AuthError::TokenRevoked => "token_revoked",
            AuthError::WrongTokenPurpose => "invalid_token_type",
            AuthError::UserNotFound => "user_not_found",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Forbidden => "forbidden",
            AuthError::TokenCreation(_)
            | AuthError::Hashing
            | AuthError::Internal(_)
            | AuthError::Config(_) => "internal_error",
        }
    }

    /// 매핑될 HTTP 상태 코드.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidRequest(_) | AuthError::InvalidUserId => 400,
            AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature
            | AuthError::TokenRevoked
            | AuthError::WrongTokenPurpose
            | AuthError::UserNotFound
            | AuthError::Unauthorized => 401,
            AuthError::Forbidden => 403,
            AuthError::TokenCreation(_)
            | AuthError::Hashing
            | AuthError::Internal(_)
            | AuthError::Config(_) => 500,
        }
    }

    /// 서버 내부 에러인지 확인합니다.
    ///
    /// 내부 에러의 상세 메시지는 클라이언트에 노출하지 않습니다.
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parse_errors_share_code() {
        assert_eq!(AuthError::TokenMalformed.code(), "invalid_token");
        assert_eq!(AuthError::TokenExpired.code(), "invalid_token");
        assert_eq!(AuthError::TokenBadSignature.code(), "invalid_token");
        assert_eq!(AuthError::TokenRevoked.code(), "token_revoked");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::Forbidden.status_code(), 403);
        assert_eq!(AuthError::Hashing.status_code(), 500);
    }

    #[test]
    fn test_internal_errors() {
        assert!(AuthError::TokenCreation("boom".into()).is_internal());
        assert!(AuthError::Internal("directory down".into()).is_internal());
        assert!(!AuthError::Unauthorized.is_internal());
    }
}
