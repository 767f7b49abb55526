//! 인증 REST API 서버.
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: Bearer 인증 및 역할 기반 추출기
//! - [`extract`]: 검증 포함 JSON 본문 추출기
//! - [`error`]: JSON 에러 응답
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AdminAuth, JwtAuth, MemberAuth};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::{metrics_router, setup_metrics_recorder};
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
