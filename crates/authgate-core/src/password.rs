//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 해싱 및 검증. 솔트는 해시마다 새로 생성됩니다.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// 비밀번호 처리 에러.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 디렉터리 해시와 로그인 검증이 공유하는 Argon2id 인스턴스.
///
/// 파라미터가 바뀌면 기존 PHC 문자열은 자체 파라미터로 계속 검증됩니다.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// 사용자 비밀번호를 디렉터리에 저장할 PHC 문자열로 해싱.
///
/// # Arguments
///
/// * `password` - 평문 비밀번호
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password(DEMO_PASSWORD)?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 로그인 시 제출된 비밀번호를 저장된 PHC 문자열과 비교.
///
/// 해시를 파싱할 수 없으면 Argon2 연산 없이 `InvalidHashFormat`을 반환하므로,
/// 호출자는 항상 유효한 해시(더미 포함)를 넘겨야 같은 비용이 듭니다.
pub fn verify_password(password: &str, stored: &str) -> Result<(), PasswordError> {
    let stored = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHashFormat)?;

    match hasher().verify_password(password.as_bytes(), &stored) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(PasswordError::VerificationFailed),
        Err(_) => Err(PasswordError::InvalidHashFormat),
    }
}
