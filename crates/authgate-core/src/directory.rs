//! 사용자 디렉터리 경계.
//!
//! 코어는 디렉터리에 두 가지만 요청합니다: 식별자(이메일)로 저장된 자격증명 조회,
//! ID로 사용자 조회. 실제 저장소(DB, 캐시 등)는 이 trait을 구현해 주입합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};
use crate::password::hash_password;
use crate::principal::{Principal, Role};

/// 저장된 자격증명.
///
/// `password_hash`는 검증에만 쓰이고 로그나 응답으로 나가지 않습니다.
#[derive(Clone)]
pub struct StoredCredentials {
    pub principal: Principal,
    pub password_hash: String,
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("principal", &self.principal)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// 사용자 디렉터리.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 이메일로 저장된 자격증명 조회.
    async fn credentials_by_email(&self, email: &str) -> AuthResult<Option<StoredCredentials>>;

    /// ID로 사용자 조회.
    async fn user_by_id(&self, id: i64) -> AuthResult<Option<Principal>>;
}

#[derive(Default)]
struct DirectoryState {
    by_email: HashMap<String, StoredCredentials>,
    email_by_id: HashMap<i64, String>,
}

/// 메모리 기반 사용자 디렉터리.
///
/// 데모 서버와 테스트에서 사용합니다.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    state: RwLock<DirectoryState>,
}

/// 데모 계정 공통 비밀번호.
pub const DEMO_PASSWORD: &str = "secret123";

impl InMemoryUserDirectory {
    /// 빈 디렉터리 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 데모 계정이 들어 있는 디렉터리 생성.
    ///
    /// - `admin@example.com` (ID 1, admin)
    /// - `user@example.com` (ID 2, user)
    /// - `user2@example.com` (ID 3, user)
    ///
    /// 모든 계정의 비밀번호는 [`DEMO_PASSWORD`]입니다.
    pub fn with_demo_users() -> AuthResult<Self> {
        let mut state = DirectoryState::default();
        for principal in [
            Principal::new(1, "admin@example.com", Role::Admin),
            Principal::new(2, "user@example.com", Role::User),
            Principal::new(3, "user2@example.com", Role::User),
        ] {
            let password_hash = hash_password(DEMO_PASSWORD).map_err(|_| AuthError::Hashing)?;
            Self::insert_into(&mut state, principal, password_hash);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// 사용자 추가 (같은 ID나 이메일이 있으면 교체).
    pub async fn insert(&self, principal: Principal, password: &str) -> AuthResult<()> {
        let password_hash = hash_password(password).map_err(|_| AuthError::Hashing)?;
        let mut state = self.state.write().await;
        Self::insert_into(&mut state, principal, password_hash);
        Ok(())
    }

    /// 사용자 제거. 제거된 사용자가 있으면 `true`.
    pub async fn remove(&self, id: i64) -> bool {
        let mut state = self.state.write().await;
        match state.email_by_id.remove(&id) {
            Some(email) => state.by_email.remove(&email).is_some(),
            None => false,
        }
    }

    /// 등록된 사용자 수.
    pub async fn len(&self) -> usize {
        self.state.read().await.email_by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn insert_into(state: &mut DirectoryState, principal: Principal, password_hash: String) {
        if let Some(old_email) = state.email_by_id.remove(&principal.id) {
            state.by_email.remove(&old_email);
        }
        if let Some(old) = state.by_email.remove(&principal.email) {
            state.email_by_id.remove(&old.principal.id);
        }

        state
            .email_by_id
            .insert(principal.id, principal.email.clone());
        state.by_email.insert(
            principal.email.clone(),
            StoredCredentials {
                principal,
                password_hash,
            },
        );
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn credentials_by_email(&self, email: &str) -> AuthResult<Option<StoredCredentials>> {
        Ok(self.state.read().await.by_email.get(email).cloned())
    }

    async fn user_by_id(&self, id: i64) -> AuthResult<Option<Principal>> {
        let state = self.state.read().await;
        Ok(state
            .email_by_id
            .get(&id)
            .and_then(|email| state.by_email.get(email))
            .map(|creds| creds.principal.clone()))
    }
}
