//! Axum integration: decoration verdicts as response extensions.

use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::application::decoration::{DecorationStrategy, RequestKind, RequestView};

/// Response extension recording the decoration verdict for a request.
///
/// The layout layer reads it to decide whether to wrap the body with site
/// chrome; a missing extension means the middleware did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorable(pub bool);

/// Middleware evaluating decoration eligibility once the inner handler ran.
///
/// The matched route pattern stands in for the route name. Axum has no
/// sub-request notion, so every evaluation uses [`RequestKind::Primary`];
/// embedders that render fragments through a separate path pass
/// [`RequestKind::Sub`] to the strategy themselves.
pub async fn evaluate_decoration(
    State(strategy): State<Arc<DecorationStrategy>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let route_name = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());
    let headers = request.headers().clone();

    let mut response = next.run(request).await;

    let view = RequestView {
        route_name: route_name.as_deref(),
        path: &path,
        headers: &headers,
    };
    let verdict = Decorable(strategy.is_decorable(view, RequestKind::Primary, &response));
    response.extensions_mut().insert(verdict);
    response
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        response::Html,
        routing::get,
    };
    use regex::Regex;
    use tower::ServiceExt;

    use super::*;
    use crate::application::decoration::DECORABLE_HEADER;

    fn app(strategy: DecorationStrategy) -> Router {
        Router::new()
            .route("/", get(|| async { Html("<h1>home</h1>") }))
            .route("/fragment", get(|| async { Html("<p>embedded</p>") }))
            .layer(middleware::from_fn_with_state(
                Arc::new(strategy),
                evaluate_decoration,
            ))
    }

    fn verdict(response: &Response) -> Option<Decorable> {
        response.extensions().get::<Decorable>().copied()
    }

    #[tokio::test]
    async fn html_responses_are_tagged_decorable() {
        let response = app(DecorationStrategy::default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(verdict(&response), Some(Decorable(true)));
    }

    #[tokio::test]
    async fn xhr_requests_are_tagged_not_decorable() {
        let request = Request::builder()
            .uri("/")
            .header("x-requested-with", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        let response = app(DecorationStrategy::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(verdict(&response), Some(Decorable(false)));
    }

    #[tokio::test]
    async fn ignored_uris_are_tagged_not_decorable() {
        let strategy = DecorationStrategy::new(
            Vec::new(),
            Vec::new(),
            vec![Regex::new("^/fragment").expect("valid test pattern")],
        );
        let response = app(strategy)
            .oneshot(
                Request::builder()
                    .uri("/fragment")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(verdict(&response), Some(Decorable(false)));
    }

    #[tokio::test]
    async fn unmatched_routes_are_tagged_not_decorable() {
        let response = app(DecorationStrategy::default())
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // 404 fallback: wrong status and no matched route.
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(verdict(&response), Some(Decorable(false)));
    }

    #[tokio::test]
    async fn handlers_can_opt_out_via_the_response_header() {
        let router = Router::new()
            .route(
                "/",
                get(|| async { ([(DECORABLE_HEADER, "false")], Html("<h1>raw</h1>")) }),
            )
            .layer(middleware::from_fn_with_state(
                Arc::new(DecorationStrategy::default()),
                evaluate_decoration,
            ));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(verdict(&response), Some(Decorable(false)));
    }
}
