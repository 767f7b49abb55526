//! 인증 주체와 역할.
//!
//! 역할은 닫힌 열거형이며, 전체 접근 권한 여부는 [`Role::has_universal_access`]로만 판단합니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 일반 사용자 - 자신의 리소스만 접근
    User,
    /// 관리자 - 모든 리소스 접근
    Admin,
}

impl Role {
    /// 소유권 검사(ABAC)를 면제받는 역할인지 확인.
    pub fn has_universal_access(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 소문자 역할 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인증된 주체.
///
/// 외부 사용자 디렉터리가 소유하며 코어는 읽기만 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// 사용자 ID
    pub id: i64,
    /// 이메일 (고유)
    pub email: String,
    /// 역할
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_access() {
        assert!(Role::Admin.has_universal_access());
        assert!(!Role::User.has_universal_access());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("USER"), Some(Role::User));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::User);

        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_principal_serialization() {
        let principal = Principal::new(2, "user@example.com", Role::User);
        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 2, "email": "user@example.com", "role": "user"})
        );
    }
}
