//! 인증 API 서버.
//!
//! 로그인, 토큰 갱신, 로그아웃과 보호된 사용자 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use authgate_api::metrics::{metrics_router, setup_metrics_recorder};
use authgate_api::middleware::metrics_layer;
use authgate_api::routes::create_api_router;
use authgate_api::state::AppState;
use authgate_core::{
    init_logging, AuthConfig, InMemoryUserDirectory, LogConfig, RefreshTokenRegistry,
    SessionService, TokenSigner,
};

/// 정리 태스크 종료 대기 시간.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self { host, port }
    }

    /// 소켓 주소 반환.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`가 설정되어 있으면 해당 origin만 허용합니다.
fn cors_layer() -> CorsLayer {
    let allowed = std::env::var("CORS_ORIGINS").ok().filter(|o| !o.is_empty());

    let allow_origin = match &allowed {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    registry: Arc<RefreshTokenRegistry>,
) -> Router {
    Router::new()
        .merge(metrics_router(metrics_handle, registry))
        .merge(create_api_router().with_state(state))
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    init_logging(LogConfig::from_env()).map_err(|e| anyhow::anyhow!(e))?;
    info!("Starting authgate API server...");

    let metrics_handle = setup_metrics_recorder()?;

    let auth_config = AuthConfig::load().map_err(|e| {
        error!(error = %e, "인증 설정이 유효하지 않습니다. JWT_SECRET 환경변수를 확인하세요.");
        e
    })?;

    let server = ServerConfig::from_env();
    let addr = server.socket_addr().map_err(|e| {
        error!(
            host = %server.host,
            port = server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    let directory = InMemoryUserDirectory::with_demo_users()?;
    warn!("Using in-memory demo user directory");

    // 전역 종료 토큰 (정리 태스크와 공유)
    let shutdown_token = CancellationToken::new();

    let registry = Arc::new(RefreshTokenRegistry::new(auth_config.revoked_retention));
    let sessions = Arc::new(SessionService::new(
        Arc::new(directory),
        Arc::new(TokenSigner::new(&auth_config)),
        registry.clone(),
        shutdown_token.clone(),
    ));
    let cleanup_handle = sessions.start_cleanup(auth_config.cleanup_interval);

    let state = Arc::new(AppState::new(sessions.clone()));
    info!(version = %state.version, "Application state initialized");

    let app = create_router(state, metrics_handle, registry);

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    sessions.shutdown();

    match tokio::time::timeout(SHUTDOWN_GRACE, cleanup_handle).await {
        Ok(Ok(())) => info!("Cleanup task stopped"),
        Ok(Err(e)) => warn!(error = %e, "Cleanup task ended abnormally"),
        Err(_) => warn!("Cleanup task did not stop in time, forcing shutdown"),
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
