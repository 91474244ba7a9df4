use std::future::Future;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, digest, items, pvz, receptions, telemetry};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router())
        .merge(pvz::router())
        .merge(receptions::router())
        .merge(items::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive());
    traced(api)
}

/// Internal listener for the bulk pickup point digest.
pub fn build_digest_app(state: AppState) -> Router {
    traced(digest::router().with_state(state))
}

fn traced(router: Router) -> Router {
    router
        .layer(axum::middleware::from_fn(telemetry::track_http))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(
    name: &'static str,
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(listener = name, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!(listener = name, "stopped");
    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt::{JwtKeys, TokenService},
        model::{City, Role},
        telemetry::tests::{recorded, recorder},
        testing::MemoryStore,
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use time::macros::datetime;
    use tower::ServiceExt;

    fn bearer(state: &AppState, role: Role) -> String {
        let token = JwtKeys::from_config(&state.config.jwt)
            .issue(role)
            .expect("issue token");
        format!("Bearer {token}")
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.expect("response");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    fn post(uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        req.body(Body::from(body.to_string())).expect("request")
    }

    fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().method(Method::GET).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        req.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake(MemoryStore::new()));
        let res = app.oneshot(get("/health", None)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn api_requests_are_measured() {
        let recorder = recorder();
        recorded(&recorder, async {
            let app = build_app(AppState::fake(MemoryStore::new()));
            let res = app.oneshot(get("/health", None)).await.expect("response");
            assert_eq!(res.status(), StatusCode::OK);
        });
        let out = recorder.handle().render();
        assert!(out
            .lines()
            .any(|l| l.starts_with("http_requests_total{") && l.contains(r#"path="/health""#)));
        assert!(out.contains("http_response_time_milliseconds_bucket"));
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let state = AppState::fake(MemoryStore::new());
        let app = build_app(state);

        let (status, body) = call(app.clone(), post("/pvz", None, serde_json::json!({"city": "Москва"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "access denied");

        let (status, _) = call(app, post("/pvz", Some("Bearer garbage"), serde_json::json!({"city": "Москва"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dummy_login_token_drives_pvz_creation() {
        let state = AppState::fake(MemoryStore::new());
        let app = build_app(state);

        let (status, token) = call(
            app.clone(),
            post("/dummyLogin", None, serde_json::json!({"role": "moderator"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = token.as_str().expect("token string").to_string();

        // the quoted form the login endpoint returns is accepted as well
        let auth = format!("Bearer \"{token}\"");
        let (status, body) = call(
            app,
            post("/pvz", Some(auth.as_str()), serde_json::json!({"city": "Казань"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["city"], "Казань");
        assert!(body["registrationDate"].is_string());
    }

    #[tokio::test]
    async fn reception_and_item_flow() {
        let store = MemoryStore::new();
        let pvz = store.add_pickup_point(City::Moscow, datetime!(2025-01-01 00:00 UTC));
        let state = AppState::fake(store.clone());
        let employee = bearer(&state, Role::Employee);
        let moderator = bearer(&state, Role::Moderator);
        let app = build_app(state);

        let (status, reception) = call(
            app.clone(),
            post("/receptions", Some(employee.as_str()), serde_json::json!({"pvzId": pvz.id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reception["status"], "in_progress");
        assert_eq!(reception["pvzId"], pvz.id.to_string());

        let (status, body) = call(
            app.clone(),
            post("/receptions", Some(employee.as_str()), serde_json::json!({"pvzId": pvz.id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "reception already opened");

        let (status, item) = call(
            app.clone(),
            post(
                "/items",
                Some(employee.as_str()),
                serde_json::json!({"pvzId": pvz.id, "type": "электроника"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["type"], "электроника");
        assert_eq!(item["receptionId"], reception["id"]);

        let (status, _) = call(
            app.clone(),
            post(
                "/items",
                Some(moderator.as_str()),
                serde_json::json!({"pvzId": pvz.id, "type": "обувь"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, list) = call(app.clone(), get("/pvz?page=1&limit=10", Some(moderator.as_str()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["pvz"]["id"], pvz.id.to_string());
        assert_eq!(list[0]["receptions"][0]["items"][0]["id"], item["id"]);

        let uri = format!("/pvz/{}/delete_last_item", pvz.id);
        let (status, _) = call(app.clone(), post(&uri, Some(employee.as_str()), serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(app.clone(), post(&uri, Some(employee.as_str()), serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "no items left to delete");

        let uri = format!("/pvz/{}/close_last_reception", pvz.id);
        let (status, closed) = call(app.clone(), post(&uri, Some(employee.as_str()), serde_json::Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["status"], "close");

        let (status, list) = call(app, get("/pvz", Some(employee.as_str()))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list[0]["receptions"][0].get("items").is_none());
    }

    #[tokio::test]
    async fn malformed_body_and_query_are_invalid_requests() {
        let state = AppState::fake(MemoryStore::new());
        let employee = bearer(&state, Role::Employee);
        let app = build_app(state);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/receptions")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, employee.as_str())
            .body(Body::from("{not json"))
            .expect("request");
        let (status, body) = call(app.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().expect("message").starts_with("invalid request"));

        let (status, _) = call(app.clone(), get("/pvz?page=abc", Some(employee.as_str()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app, get("/pvz?startDate=01-02-2025", Some(employee.as_str()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_and_login_over_http() {
        let app = build_app(AppState::fake(MemoryStore::new()));
        let creds = serde_json::json!({"email": "a@b.com", "password": "password1", "role": "employee"});

        let (status, user) = call(app.clone(), post("/register", None, creds.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "employee");

        let (status, _) = call(app.clone(), post("/register", None, creds)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, token) = call(
            app.clone(),
            post("/login", None, serde_json::json!({"email": "a@b.com", "password": "password1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(token.is_string());

        let (status, body) = call(
            app,
            post("/login", None, serde_json::json!({"email": "a@b.com", "password": "password2"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "email or password is wrong");
    }

    #[tokio::test]
    async fn digest_lists_without_token() {
        let store = MemoryStore::new();
        let pvz = store.add_pickup_point(City::SaintPetersburg, datetime!(2025-01-01 00:00 UTC));
        let app = build_digest_app(AppState::fake(Arc::clone(&store)));
        let (status, body) = call(app, get("/pvz/list", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pvzs"][0]["id"], pvz.id.to_string());
        assert_eq!(body["pvzs"][0]["city"], "Санкт-Петербург");
    }
}
