//! Refresh Token 레지스트리.
//!
//! 발급된 모든 refresh 토큰의 만료/폐기 상태를 추적합니다.
//! 코어에서 유일하게 공유되는 가변 상태이며 하나의 RwLock으로 보호됩니다.
//!
//! # 토큰 상태
//!
//! ```text
//! Active ──revoke──▶ Revoked (종료)
//!   │
//!   └──시간 경과──▶ Expired (종료, 조회 시점에 판정)
//!                      │
//!                 cleanup ▼
//!                   Purged  (미등록과 동일하게 폐기로 보고)
//! ```
//!
//! 등록되지 않은 토큰은 폐기된 것으로 취급합니다. 따라서 정리(purge)된 토큰이
//! 다시 유효해지는 일은 없습니다.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// 레지스트리 레코드.
///
/// 키는 서명된 토큰 문자열 자체입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    /// 토큰 만료 시각
    pub expires_at: DateTime<Utc>,
    /// 폐기 시각 (폐기되지 않았으면 None)
    pub revoked_at: Option<DateTime<Utc>>,
}

/// 조회 시점의 토큰 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// 사용 가능
    Active,
    /// 만료됨 (아직 정리되지 않음)
    Expired,
    /// 명시적으로 폐기됨
    Revoked,
    /// 등록된 적 없거나 이미 정리됨
    Unknown,
}

impl TokenState {
    /// `is_revoked` 관점에서 사용 불가 상태인지.
    pub fn is_unusable(&self) -> bool {
        !matches!(self, TokenState::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenState::Active => "active",
            TokenState::Expired => "expired",
            TokenState::Revoked => "revoked",
            TokenState::Unknown => "unknown",
        }
    }
}

/// 레코드 수 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// 폐기되지 않은 레코드 (만료됐지만 정리 전인 것 포함)
    pub active: usize,
    /// 폐기 기록
    pub revoked: usize,
}

/// 정리 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// 만료되어 삭제된 레코드
    pub expired_purged: usize,
    /// 보존 기간이 지나 삭제된 폐기 기록
    pub revoked_purged: usize,
}

impl CleanupStats {
    pub fn total(&self) -> usize {
        self.expired_purged + self.revoked_purged
    }
}

/// Refresh Token 레지스트리.
///
/// 서비스 시작 시 한 번 생성해 `Arc`로 모든 요청 처리기에 공유합니다.
pub struct RefreshTokenRegistry {
    records: RwLock<HashMap<String, RefreshTokenRecord>>,
    revoked_retention: Duration,
}

impl Default for RefreshTokenRegistry {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

impl RefreshTokenRegistry {
    /// 새 레지스트리 생성.
    ///
    /// # Arguments
    ///
    /// * `revoked_retention` - 폐기 기록 보존 기간
    pub fn new(revoked_retention: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            revoked_retention,
        }
    }

    /// 새로 발급된 토큰 등록.
    ///
    /// 같은 키로 다시 호출하면 만료 시각만 갱신합니다. 이미 폐기된 토큰은 되살리지 않습니다.
    pub async fn store(&self, token: &str, expires_at: DateTime<Utc>) {
        let mut records = self.records.write().await;
        match records.get_mut(token) {
            Some(record) if record.revoked_at.is_some() => {}
            Some(record) => record.expires_at = expires_at,
            None => {
                records.insert(
                    token.to_string(),
                    RefreshTokenRecord {
                        expires_at,
                        revoked_at: None,
                    },
                );
            }
        }
    }

    /// 토큰이 사용 불가한지 확인 (폐기, 만료, 미등록 모두 `true`).
    pub async fn is_revoked(&self, token: &str) -> bool {
        self.is_revoked_at(token, Utc::now()).await
    }

    /// 지정한 시각 기준으로 사용 불가 여부 확인.
    pub async fn is_revoked_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.state_at(token, now).await.is_unusable()
    }

    /// 토큰 상태 조회.
    pub async fn state(&self, token: &str) -> TokenState {
        self.state_at(token, Utc::now()).await
    }

    /// 지정한 시각 기준 토큰 상태 조회.
    pub async fn state_at(&self, token: &str, now: DateTime<Utc>) -> TokenState {
        let records = self.records.read().await;
        match records.get(token) {
            None => TokenState::Unknown,
            Some(record) if record.revoked_at.is_some() => TokenState::Revoked,
            Some(record) if now > record.expires_at => TokenState::Expired,
            Some(_) => TokenState::Active,
        }
    }

    /// 토큰 폐기.
    ///
    /// 상태가 바뀌었으면 `true`. 이미 폐기되었거나 등록되지 않은 토큰은
    /// 그대로 둡니다 (미등록 토큰은 이미 폐기로 보고되므로 관측 결과가 같음).
    pub async fn revoke(&self, token: &str) -> bool {
        self.revoke_at(token, Utc::now()).await
    }

    /// 지정한 시각으로 토큰 폐기.
    pub async fn revoke_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(now);
                true
            }
            _ => false,
        }
    }

    /// 만료된 레코드와 보존 기간이 지난 폐기 기록 삭제.
    ///
    /// 주기적인 백그라운드 태스크에서만 호출합니다.
    pub async fn cleanup(&self) -> CleanupStats {
        self.cleanup_at(Utc::now()).await
    }

    /// 지정한 시각 기준으로 정리.
    pub async fn cleanup_at(&self, now: DateTime<Utc>) -> CleanupStats {
        let mut stats = CleanupStats::default();
        let retention = self.revoked_retention;

        let mut records = self.records.write().await;
        records.retain(|_, record| match record.revoked_at {
            None if now > record.expires_at => {
                stats.expired_purged += 1;
                false
            }
            Some(revoked_at) if now - revoked_at > retention => {
                stats.revoked_purged += 1;
                false
            }
            _ => true,
        });

        stats
    }

    /// 레코드 수 통계.
    pub async fn stats(&self) -> RegistryStats {
        let records = self.records.read().await;
        let revoked = records.values().filter(|r| r.revoked_at.is_some()).count();
        RegistryStats {
            active: records.len() - revoked,
            revoked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_days(days: i64) -> DateTime<Utc> {
        Utc::now() + Duration::days(days)
    }

    #[tokio::test]
    async fn test_store_and_lookup() {
        let registry = RefreshTokenRegistry::default();
        registry.store("t1", in_days(7)).await;

        assert!(!registry.is_revoked("t1").await);
        assert_eq!(registry.state("t1").await, TokenState::Active);
    }

    #[tokio::test]
    async fn test_unknown_token_is_revoked() {
        let registry = RefreshTokenRegistry::default();
        assert!(registry.is_revoked("never-issued").await);
        assert_eq!(registry.state("never-issued").await, TokenState::Unknown);
    }

    #[tokio::test]
    async fn test_expired_token_is_revoked_without_revoke() {
        let registry = RefreshTokenRegistry::default();
        registry.store("old", Utc::now() - Duration::days(1)).await;

        assert!(registry.is_revoked("old").await);
        assert_eq!(registry.state("old").await, TokenState::Expired);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = RefreshTokenRegistry::default();
        registry.store("t1", in_days(7)).await;

        let first_at = Utc::now();
        assert!(registry.revoke_at("t1", first_at).await);
        assert!(!registry.revoke_at("t1", first_at + Duration::days(3)).await);
        assert!(registry.is_revoked("t1").await);

        // 두 번째 폐기가 보존 기간 시작점을 늦추지 않음
        let stats = registry
            .cleanup_at(first_at + Duration::days(7) + Duration::seconds(1))
            .await;
        assert_eq!(stats.revoked_purged, 1);
    }

    #[tokio::test]
    async fn test_revoke_unknown_is_noop() {
        let registry = RefreshTokenRegistry::default();
        assert!(!registry.revoke("ghost").await);
        assert!(registry.is_revoked("ghost").await);
        assert_eq!(registry.stats().await, RegistryStats::default());
    }

    #[tokio::test]
    async fn test_store_does_not_resurrect_revoked() {
        let registry = RefreshTokenRegistry::default();
        registry.store("t1", in_days(7)).await;
        registry.revoke("t1").await;
        registry.store("t1", in_days(7)).await;

        assert_eq!(registry.state("t1").await, TokenState::Revoked);
    }

    #[tokio::test]
    async fn test_store_same_key_updates_expiry() {
        let registry = RefreshTokenRegistry::default();
        registry.store("t1", Utc::now() - Duration::hours(1)).await;
        registry.store("t1", in_days(1)).await;

        assert!(!registry.is_revoked("t1").await);
        assert_eq!(registry.stats().await.active, 1);
    }

    #[tokio::test]
    async fn test_cleanup() {
        let registry = RefreshTokenRegistry::new(Duration::days(7));
        let now = Utc::now();

        registry.store("live", now + Duration::days(7)).await;
        registry.store("expired", now - Duration::seconds(1)).await;
        registry.store("revoked-recent", now + Duration::days(7)).await;
        registry.store("revoked-old", now + Duration::days(7)).await;
        registry.revoke_at("revoked-recent", now - Duration::days(1)).await;
        registry.revoke_at("revoked-old", now - Duration::days(8)).await;

        let stats = registry.cleanup_at(now).await;
        assert_eq!(
            stats,
            CleanupStats {
                expired_purged: 1,
                revoked_purged: 1
            }
        );
        assert_eq!(stats.total(), 2);
        assert_eq!(
            registry.stats().await,
            RegistryStats {
                active: 1,
                revoked: 1
            }
        );

        // 정리된 토큰도 계속 폐기로 보고됨
        assert!(registry.is_revoked("expired").await);
        assert!(registry.is_revoked("revoked-old").await);
        assert!(!registry.is_revoked("live").await);
    }
}
