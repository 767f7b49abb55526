//! 세션 수명주기 통합 테스트.
//!
//! 로그인 → refresh 회전 → 로그아웃 흐름과 게이트 판정을 공개 API만으로 검증합니다.

use std::sync::Arc;

use authgate_core::gate::{authenticate, require_role, require_subject, ADMIN_ROLES, MEMBER_ROLES};
use authgate_core::{
    AuthConfig, AuthError, InMemoryUserDirectory, Principal, RefreshTokenRegistry, Role,
    SessionService, TokenSigner, DEMO_PASSWORD,
};
use chrono::{Duration, Utc};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

const TEST_SECRET: &str = "integration-test-secret-key-at-least-32-bytes";

struct Harness {
    directory: Arc<InMemoryUserDirectory>,
    signer: Arc<TokenSigner>,
    registry: Arc<RefreshTokenRegistry>,
    service: SessionService,
}

fn harness() -> Harness {
    let config = AuthConfig::new(TEST_SECRET);
    let directory = Arc::new(InMemoryUserDirectory::with_demo_users().unwrap());
    let signer = Arc::new(TokenSigner::new(&config));
    let registry = Arc::new(RefreshTokenRegistry::new(config.revoked_retention));
    let service = SessionService::new(
        directory.clone(),
        signer.clone(),
        registry.clone(),
        CancellationToken::new(),
    );

    Harness {
        directory,
        signer,
        registry,
        service,
    }
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let h = harness();

    let unknown = h
        .service
        .login("nobody@example.com", DEMO_PASSWORD)
        .await
        .unwrap_err();
    let wrong = h
        .service
        .login("user@example.com", "not-the-password")
        .await
        .unwrap_err();

    assert_eq!(unknown, AuthError::InvalidCredentials);
    assert_eq!(unknown, wrong);
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert_eq!(h.registry.stats().await.active, 0);
}

#[tokio::test]
async fn login_then_bearer_gate_yields_principal() {
    let h = harness();
    let outcome = h.service.login("user@example.com", DEMO_PASSWORD).await.unwrap();

    let header = format!("Bearer {}", outcome.tokens.access_token);
    let claims = authenticate(&h.signer, Some(&header)).unwrap();

    assert_eq!(
        claims.principal(),
        Principal::new(2, "user@example.com", Role::User)
    );
    assert_eq!(outcome.tokens.expires_in, 900);
    assert_eq!(outcome.tokens.token_type, "Bearer");
}

#[tokio::test]
async fn rotated_refresh_token_cannot_be_replayed() {
    let h = harness();
    let outcome = h.service.login("user@example.com", DEMO_PASSWORD).await.unwrap();
    let first = outcome.tokens.refresh_token;

    let second = h.service.refresh(&first).await.unwrap().refresh_token;
    assert_eq!(h.service.refresh(&first).await, Err(AuthError::TokenRevoked));

    // 새 토큰은 계속 사용 가능
    let third = h.service.refresh(&second).await.unwrap().refresh_token;
    assert_ne!(second, third);
}

#[tokio::test]
async fn expired_refresh_token_is_reported_revoked() {
    let h = harness();

    // 8일 전에 발급된 토큰 (7일 수명)
    let stale = h
        .signer
        .sign_refresh_at(2, Utc::now() - Duration::days(8))
        .unwrap();
    h.registry.store(&stale.token, stale.expires_at).await;

    assert!(h.registry.is_revoked(&stale.token).await);
    assert_eq!(h.service.refresh(&stale.token).await, Err(AuthError::TokenRevoked));
}

#[tokio::test]
async fn refresh_for_removed_user_is_rejected_without_revoking() {
    let h = harness();
    let outcome = h.service.login("user2@example.com", DEMO_PASSWORD).await.unwrap();

    assert!(h.directory.remove(3).await);
    assert_eq!(
        h.service.refresh(&outcome.tokens.refresh_token).await,
        Err(AuthError::UserNotFound)
    );
    // 모든 검사를 통과하지 못했으므로 토큰은 폐기되지 않음
    assert!(!h.registry.is_revoked(&outcome.tokens.refresh_token).await);
}

#[tokio::test]
async fn logout_then_refresh_is_rejected() {
    let h = harness();
    let outcome = h.service.login("admin@example.com", DEMO_PASSWORD).await.unwrap();

    h.service.logout(&outcome.tokens.refresh_token).await;
    assert_eq!(
        h.service.refresh(&outcome.tokens.refresh_token).await,
        Err(AuthError::TokenRevoked)
    );

    // access 토큰은 자연 만료 전까지 계속 유효
    let header = format!("Bearer {}", outcome.tokens.access_token);
    assert!(authenticate(&h.signer, Some(&header)).is_ok());
}

#[tokio::test]
async fn refresh_token_cannot_pass_bearer_gate() {
    let h = harness();
    let outcome = h.service.login("user@example.com", DEMO_PASSWORD).await.unwrap();

    let header = format!("Bearer {}", outcome.tokens.refresh_token);
    assert_eq!(authenticate(&h.signer, Some(&header)), Err(AuthError::Unauthorized));
}

#[tokio::test]
async fn rbac_and_abac_decisions() {
    let h = harness();
    let user = h.service.login("user@example.com", DEMO_PASSWORD).await.unwrap();
    let admin = h.service.login("admin@example.com", DEMO_PASSWORD).await.unwrap();

    let user_claims = h.signer.parse_access(&user.tokens.access_token).unwrap();
    let admin_claims = h.signer.parse_access(&admin.tokens.access_token).unwrap();

    assert!(require_role(&user_claims, MEMBER_ROLES).is_ok());
    assert_eq!(require_role(&user_claims, ADMIN_ROLES), Err(AuthError::Forbidden));
    assert!(require_role(&admin_claims, ADMIN_ROLES).is_ok());

    assert!(require_subject(&user_claims, 2).is_ok());
    assert_eq!(require_subject(&user_claims, 3), Err(AuthError::Forbidden));
    assert!(require_subject(&admin_claims, 3).is_ok());
}

#[tokio::test]
async fn replayed_token_fails_for_every_concurrent_caller() {
    let h = harness();
    let outcome = h.service.login("user@example.com", DEMO_PASSWORD).await.unwrap();
    let token = outcome.tokens.refresh_token;

    h.service.refresh(&token).await.unwrap();
    let (a, b) = tokio::join!(h.service.refresh(&token), h.service.refresh(&token));
    assert_eq!(a.map(|_| ()), Err(AuthError::TokenRevoked));
    assert_eq!(b.map(|_| ()), Err(AuthError::TokenRevoked));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn fresh_token_is_redeemed_once_under_concurrent_refresh() {
    let h = harness();
    let service = Arc::new(h.service);

    for _ in 0..20 {
        let outcome = service.login("user@example.com", DEMO_PASSWORD).await.unwrap();
        let token = Arc::new(outcome.tokens.refresh_token);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let token = token.clone();
                tokio::spawn(async move { service.refresh(&token).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(e, AuthError::TokenRevoked),
            }
        }
        assert_eq!(successes, 1);
    }

    // 라운드마다 회전으로 생긴 토큰 하나만 활성 상태로 남음
    assert_eq!(h.registry.stats().await.active, 20);
}

proptest! {
    #[test]
    fn unknown_tokens_are_always_revoked(token in "[A-Za-z0-9._-]{0,64}") {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let registry = RefreshTokenRegistry::default();
        prop_assert!(rt.block_on(registry.is_revoked(&token)));
    }

    #[test]
    fn role_parse_accepts_only_known_roles(name in "[a-zA-Z]{1,12}") {
        let lowered = name.to_lowercase();
        let expected = match lowered.as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        };
        prop_assert_eq!(Role::parse(&name), expected);
    }
}
