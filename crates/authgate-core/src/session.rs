//! 세션 서비스.
//!
//! 로그인, refresh(회전), 로그아웃을 조율합니다.
//!
//! # 회전
//!
//! refresh 토큰은 1회용입니다. `refresh`가 성공하면 제시된 토큰은 폐기되고
//! 새 페어가 등록됩니다. 폐기와 새 페어 전달 사이에 장애가 나면 클라이언트는
//! 다시 로그인해야 합니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::credentials::{CredentialError, CredentialVerifier};
use crate::directory::UserDirectory;
use crate::error::{AuthError, AuthResult};
use crate::principal::Principal;
use crate::registry::RefreshTokenRegistry;
use crate::sweeper::spawn_cleanup_task;
use crate::token::{TokenPair, TokenSigner};

/// 로그인 결과.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub principal: Principal,
}

/// 세션 서비스.
pub struct SessionService {
    verifier: CredentialVerifier,
    directory: Arc<dyn UserDirectory>,
    signer: Arc<TokenSigner>,
    registry: Arc<RefreshTokenRegistry>,
    shutdown: CancellationToken,
}

impl SessionService {
    /// 새 서비스 생성.
    ///
    /// # Arguments
    ///
    /// * `directory` - 사용자 디렉터리
    /// * `signer` - 토큰 서명기
    /// * `registry` - refresh 토큰 레지스트리
    /// * `shutdown` - 정리 태스크 종료 신호
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        signer: Arc<TokenSigner>,
        registry: Arc<RefreshTokenRegistry>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            verifier: CredentialVerifier::new(directory.clone()),
            directory,
            signer,
            registry,
            shutdown,
        }
    }

    pub fn signer(&self) -> &Arc<TokenSigner> {
        &self.signer
    }

    pub fn registry(&self) -> &Arc<RefreshTokenRegistry> {
        &self.registry
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// 주기 정리 태스크 시작.
    ///
    /// 생성 시 받은 종료 신호가 취소되면 태스크가 끝납니다.
    pub fn start_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        spawn_cleanup_task(self.registry.clone(), interval, self.shutdown.clone())
    }

    /// 정리 태스크에 종료 신호 전달.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// 로그인.
    ///
    /// 알 수 없는 이메일과 잘못된 비밀번호는 모두 `InvalidCredentials`입니다.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let principal = match self.verifier.verify(email, password).await {
            Ok(principal) => principal,
            Err(CredentialError::Unavailable(msg)) => {
                warn!(error = %msg, "User directory unavailable during login");
                return Err(AuthError::Internal(msg));
            }
            Err(e) => {
                warn!(email = %email, reason = %e, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let tokens = self.issue_pair(&principal).await?;
        info!(user_id = principal.id, role = %principal.role, "User logged in");

        Ok(LoginOutcome { tokens, principal })
    }

    /// refresh 토큰으로 새 페어 발급.
    ///
    /// 검사 순서: 레지스트리 폐기 여부 → 서명/만료 → 용도 → 사용자 존재.
    /// 모든 검사를 통과한 경우에만 제시된 토큰을 폐기합니다.
    /// 동시에 같은 토큰을 제시한 호출자 중 폐기에 성공한 하나만 새 페어를 받습니다.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let state = self.registry.state(refresh_token).await;
        if state.is_unusable() {
            warn!(state = state.as_str(), "Refresh rejected: token not active");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.signer.parse(refresh_token).map_err(|e| {
            warn!(error = %e, "Refresh rejected: token failed validation");
            e
        })?;
        let claims = claims.into_refresh().map_err(|e| {
            warn!(error = %e, "Refresh rejected: not a refresh token");
            e
        })?;

        let principal = self
            .directory
            .user_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = claims.sub, "Refresh rejected: user no longer exists");
                AuthError::UserNotFound
            })?;

        // 폐기 전이에 성공한 호출자만 새 페어를 받음
        if !self.registry.revoke(refresh_token).await {
            warn!(user_id = principal.id, "Refresh rejected: token already redeemed");
            return Err(AuthError::TokenRevoked);
        }
        let tokens = self.issue_pair(&principal).await?;
        info!(user_id = principal.id, "Refresh token rotated");

        Ok(tokens)
    }

    /// 로그아웃.
    ///
    /// 알 수 없거나 이미 폐기된 토큰도 성공으로 처리합니다.
    pub async fn logout(&self, refresh_token: &str) {
        if self.registry.revoke(refresh_token).await {
            info!("Refresh token revoked by logout");
        }
    }

    async fn issue_pair(&self, principal: &Principal) -> AuthResult<TokenPair> {
        let access = self.signer.sign_access(principal)?;
        let refresh = self.signer.sign_refresh(principal.id)?;
        self.registry.store(&refresh.token, refresh.expires_at).await;

        Ok(TokenPair::bearer(access, refresh, self.signer.access_ttl()))
    }
}
