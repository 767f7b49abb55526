//! 관리자 endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AdminAuth;
use crate::state::AppState;

/// 관리자 통계 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    /// 폐기되지 않은 refresh 토큰 수 (만료 후 정리 전인 것 포함)
    pub active_refresh_tokens: usize,
    /// 보존 중인 폐기 기록 수
    pub revoked_refresh_tokens: usize,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
    /// 현재 시간
    pub time: DateTime<Utc>,
}

/// 관리자 통계.
///
/// GET /api/v1/admin/stats
pub async fn admin_stats(
    AdminAuth(_claims): AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Json<AdminStatsResponse> {
    let stats = state.registry().stats().await;

    Json(AdminStatsResponse {
        active_refresh_tokens: stats.active,
        revoked_refresh_tokens: stats.revoked,
        uptime_secs: state.uptime_secs(),
        time: Utc::now(),
    })
}

/// 관리자 라우터 생성.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new().route("/admin/stats", get(admin_stats))
}
