//! Refresh Token 레지스트리 주기 정리 태스크.
//!
//! 요청 처리 경로에서는 정리를 호출하지 않습니다. 태스크는 CancellationToken으로
//! 종료되며, 종료 후 JoinHandle을 기다리면 마지막 정리가 끝났음을 보장합니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::registry::RefreshTokenRegistry;

/// 정리 태스크 시작.
///
/// 첫 정리는 `interval`이 지난 뒤에 실행됩니다.
///
/// # Arguments
///
/// * `registry` - 정리할 레지스트리
/// * `interval` - 정리 주기
/// * `shutdown` - 취소되면 루프 종료
pub fn spawn_cleanup_task(
    registry: Arc<RefreshTokenRegistry>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs(), "Refresh token cleanup task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let stats = registry.cleanup().await;
                    if stats.total() > 0 {
                        info!(
                            expired_purged = stats.expired_purged,
                            revoked_purged = stats.revoked_purged,
                            "Refresh token registry cleaned up"
                        );
                    } else {
                        debug!("Refresh token cleanup found nothing to purge");
                    }
                }

                _ = shutdown.cancelled() => {
                    info!("Refresh token cleanup task stopped");
                    break;
                }
            }
        }
    })
}
