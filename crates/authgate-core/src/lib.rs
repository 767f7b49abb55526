//! # Authgate Core
//!
//! 인증/세션 서브시스템의 핵심 구성 요소를 제공합니다.
//!
//! - [`credentials`]: 자격증명 검증 (Argon2)
//! - [`token`]: 상태 없는 Access Token / Refresh Token 서명 및 검증
//! - [`registry`]: refresh 토큰 레지스트리 (폐기, 만료, 정리)
//! - [`session`]: 로그인, refresh 회전, 로그아웃
//! - [`gate`]: Bearer 인증과 RBAC/ABAC 인가
//! - [`directory`]: 외부 사용자 디렉터리 경계
//! - [`config`], [`logging`]: 설정 로드와 로깅 초기화

pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod gate;
pub mod logging;
pub mod password;
pub mod principal;
pub mod registry;
pub mod session;
pub mod sweeper;
pub mod token;

pub use config::AuthConfig;
pub use credentials::{CredentialError, CredentialVerifier};
pub use directory::{InMemoryUserDirectory, StoredCredentials, UserDirectory, DEMO_PASSWORD};
pub use error::{AuthError, AuthResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use password::{hash_password, verify_password, PasswordError};
pub use principal::{Principal, Role};
pub use registry::{CleanupStats, RefreshTokenRegistry, RegistryStats, TokenState};
pub use session::{LoginOutcome, SessionService};
pub use sweeper::spawn_cleanup_task;
pub use token::{AccessClaims, Claims, IssuedToken, RefreshClaims, TokenPair, TokenPurpose, TokenSigner};
