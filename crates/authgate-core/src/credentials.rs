//! 자격증명 검증.
//!
//! 제출된 비밀번호를 디렉터리에 저장된 Argon2 해시와 비교하고 인증된 주체를 돌려줍니다.

use std::sync::{Arc, OnceLock};

use tracing::{debug, error};

use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::password::{hash_password, verify_password, PasswordError};
use crate::principal::Principal;

/// 자격증명 검증 실패 사유.
///
/// 호출자(로그인)는 `NotFound`와 `BadCredentials`를 구분하지 않고
/// [`AuthError::InvalidCredentials`]로 합칩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,
    #[error("비밀번호가 일치하지 않습니다")]
    BadCredentials,
    #[error("사용자 디렉터리 오류: {0}")]
    Unavailable(String),
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotFound | CredentialError::BadCredentials => {
                AuthError::InvalidCredentials
            }
            CredentialError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}

const DUMMY_PASSWORD: &str = "authgate-timing-equalizer";

/// 알 수 없는 이메일에도 한 번의 해시 검증을 수행하기 위한 더미 해시.
///
/// 생성에 실패하면 `None`이며, 이 경우 검증 대신 같은 비용의 해싱을 수행합니다.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| match hash_password(DUMMY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(e) => {
                error!(error = %e, "Failed to build timing-equalizer hash");
                None
            }
        })
        .as_deref()
}

/// 자격증명 검증기.
#[derive(Clone)]
pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
}

impl CredentialVerifier {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        // 더미 해시 미리 생성
        let _ = dummy_hash();
        Self { directory }
    }

    /// 이메일과 비밀번호 검증.
    ///
    /// Argon2 검증은 CPU 작업이므로 blocking 스레드 풀에서 실행합니다.
    /// 존재하지 않는 이메일도 더미 해시로 같은 비용의 검증을 거칩니다.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Principal, CredentialError> {
        let stored = self
            .directory
            .credentials_by_email(email)
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        let (principal, hash) = match stored {
            Some(creds) => (Some(creds.principal), Some(creds.password_hash)),
            None => (None, dummy_hash().map(str::to_string)),
        };

        let password = password.to_string();
        let outcome = tokio::task::spawn_blocking(move || match hash {
            Some(hash) => verify_password(&password, &hash),
            // 더미 해시가 없으면 해싱으로 비용을 맞춤
            None => hash_password(&password).and(Err(PasswordError::VerificationFailed)),
        })
        .await
        .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        match (principal, outcome) {
            (Some(principal), Ok(())) => Ok(principal),
            (None, _) => Err(CredentialError::NotFound),
            (Some(principal), Err(PasswordError::InvalidHashFormat)) => {
                debug!(user_id = principal.id, "Stored password hash is not a valid PHC string");
                Err(CredentialError::BadCredentials)
            }
            (Some(_), Err(_)) => Err(CredentialError::BadCredentials),
        }
    }
}
