//! 애플리케이션 상태 관리.
//!
//! 모든 핸들러가 공유하는 상태입니다. 세션 서비스가 서명기, 레지스트리,
//! 사용자 디렉터리를 소유하고 상태는 그 핸들만 보관합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use authgate_core::{RefreshTokenRegistry, SessionService, TokenSigner, UserDirectory};

/// 애플리케이션 공유 상태.
///
/// `Arc<AppState>` 형태로 라우터에 전달됩니다.
pub struct AppState {
    /// 로그인 / refresh / 로그아웃
    pub sessions: Arc<SessionService>,

    /// 애플리케이션 버전
    pub version: String,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self {
            sessions,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 토큰 서명기.
    pub fn signer(&self) -> &TokenSigner {
        self.sessions.signer()
    }

    /// Refresh Token 레지스트리.
    pub fn registry(&self) -> &Arc<RefreshTokenRegistry> {
        self.sessions.registry()
    }

    /// 사용자 디렉터리.
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        self.sessions.directory()
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성.
///
/// 데모 계정이 들어 있는 메모리 디렉터리를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use authgate_core::{AuthConfig, InMemoryUserDirectory};
    use tokio_util::sync::CancellationToken;

    let config = AuthConfig::new("test-secret-key-for-jwt-testing-minimum-32-chars");
    let directory =
        InMemoryUserDirectory::with_demo_users().expect("Failed to seed demo users for test");
    let sessions = SessionService::new(
        Arc::new(directory),
        Arc::new(TokenSigner::new(&config)),
        Arc::new(RefreshTokenRegistry::new(config.revoked_retention)),
        CancellationToken::new(),
    );

    AppState::new(Arc::new(sessions))
}
