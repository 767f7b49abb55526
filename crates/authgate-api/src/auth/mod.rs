//! 인증 및 권한 관리.
//!
//! - Bearer access 토큰 인증 ([`JwtAuth`])
//! - 역할 기반 접근 제어 ([`MemberAuth`], [`AdminAuth`])
//!
//! 소유권 검사(ABAC)는 경로 파라미터가 필요하므로 핸들러에서
//! [`authgate_core::gate::require_subject`]로 수행합니다.

pub mod middleware;

pub use middleware::{AdminAuth, JwtAuth, MemberAuth};
