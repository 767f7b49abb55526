//! HTTP 요청 메트릭 미들웨어.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{record_http_request, UNMATCHED_ROUTE};

/// 요청 수, 상태 코드, 처리 시간을 라우트 템플릿 단위로 기록합니다.
///
/// `Router::layer`로 붙이면 라우팅 이후에 실행되므로 [`MatchedPath`]를 읽을 수 있고,
/// fallback(404)으로 간 요청은 [`UNMATCHED_ROUTE`]로 묶입니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    let response = next.run(request).await;

    record_http_request(
        &method,
        &route,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest(
                "/api/v1",
                Router::new().route("/users/{id}", get(|| async { "OK" })),
            )
            .layer(middleware::from_fn(metrics_layer))
    }

    /// 요청들을 로컬 레코더로 보내고 렌더링 결과를 반환.
    fn render_after(uris: &[&str]) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            rt.block_on(async {
                for uri in uris {
                    let request = Request::builder().uri(*uri).body(Body::empty()).unwrap();
                    app().oneshot(request).await.unwrap();
                }
            })
        });

        handle.render()
    }

    fn request_count_line(rendered: &str, route: &str) -> Option<String> {
        let label = format!("route=\"{}\"", route);
        rendered
            .lines()
            .find(|line| line.starts_with("http_requests_total{") && line.contains(&label))
            .map(str::to_string)
    }

    #[test]
    fn test_matched_requests_use_route_template() {
        let rendered = render_after(&["/api/v1/users/2", "/api/v1/users/abc"]);

        let line = request_count_line(&rendered, "/api/v1/users/{id}").unwrap();
        assert!(line.ends_with(" 2"), "{line}");
        assert!(!rendered.contains("/api/v1/users/abc"));
    }

    #[test]
    fn test_unknown_paths_share_one_label() {
        let rendered = render_after(&["/wp-admin/setup.php", "/api/v1/nope/xyz"]);

        let line = request_count_line(&rendered, UNMATCHED_ROUTE).unwrap();
        assert!(line.ends_with(" 2"), "{line}");
        assert!(!rendered.contains("wp-admin"));
        assert!(!rendered.contains("nope"));
        assert!(rendered.contains("status=\"404\""));
    }

    #[tokio::test]
    async fn test_middleware_passes_response_through() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
