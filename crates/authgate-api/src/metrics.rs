//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use authgate_core::RefreshTokenRegistry;

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭
// ============================================================================

/// 어떤 라우트에도 매칭되지 않은 요청의 라벨.
///
/// 404 요청의 원본 경로를 라벨로 쓰면 시계열이 끝없이 늘어납니다.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// 완료된 HTTP 요청 하나를 기록합니다.
///
/// `route`는 라우트 템플릿(`/api/v1/users/{id}`) 또는 [`UNMATCHED_ROUTE`]입니다.
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let method = method.to_string();
    let route = route.to_string();

    counter!("http_requests_total", "method" => method.clone(), "route" => route.clone())
        .increment(1);
    counter!(
        "http_responses_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "route" => route)
        .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 로그인 시도 기록 (outcome: "success" | 에러 코드).
pub fn record_login(outcome: &str) {
    counter!("auth_logins_total", "outcome" => outcome.to_string()).increment(1);
}

/// refresh 시도 기록 (outcome: "success" | 에러 코드).
pub fn record_refresh(outcome: &str) {
    counter!("auth_refresh_total", "outcome" => outcome.to_string()).increment(1);
}

/// 로그아웃 기록.
pub fn record_logout() {
    counter!("auth_logouts_total").increment(1);
}

/// 레지스트리 레코드 수 게이지 설정.
pub fn set_refresh_token_counts(active: usize, revoked: usize) {
    gauge!("auth_refresh_tokens_active").set(active as f64);
    gauge!("auth_refresh_tokens_revoked").set(revoked as f64);
}

// ============================================================================
// /metrics 엔드포인트
// ============================================================================

#[derive(Clone)]
struct MetricsState {
    handle: PrometheusHandle,
    registry: Arc<RefreshTokenRegistry>,
}

/// /metrics 엔드포인트 핸들러.
///
/// 렌더링 직전에 레지스트리 통계를 게이지에 반영합니다.
async fn metrics_handler(State(state): State<MetricsState>) -> String {
    let stats = state.registry.stats().await;
    set_refresh_token_counts(stats.active, stats.revoked);
    state.handle.render()
}

/// 메트릭 라우터 생성 (별도 상태).
pub fn metrics_router(handle: PrometheusHandle, registry: Arc<RefreshTokenRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState { handle, registry })
}
