use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    // Signup and login: rate limited per client IP
    let auth_routes = Router::new()
        .route("/api/users/signup", post(handlers::users::signup))
        .route("/api/users/login", post(handlers::users::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    // Every call here reaches the language model or the analyzer
    let ai_routes = Router::new()
        .route(
            "/api/match-logs/analyze",
            post(handlers::match_logs::analyze_match_log),
        )
        .route(
            "/api/injury-logs/analyze",
            post(handlers::injury_logs::analyze_rehab_log),
        )
        .route("/api/ai/analyze", post(handlers::ai::analyze_training))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::limit_ai,
        ));

    let protected_routes = Router::new()
        // Users
        .route(
            "/api/users/me",
            get(handlers::users::me).put(handlers::users::update_me),
        )
        .route("/api/users", get(handlers::users::list_users))
        // Training logs
        .route(
            "/api/training-logs",
            get(handlers::training_logs::list_training_logs)
                .post(handlers::training_logs::create_training_log),
        )
        .route(
            "/api/training-logs/by-date",
            get(handlers::training_logs::list_training_logs_by_date),
        )
        .route(
            "/api/training-logs/:id",
            delete(handlers::training_logs::delete_training_log),
        )
        // Match logs
        .route(
            "/api/match-logs",
            get(handlers::match_logs::list_match_logs)
                .post(handlers::match_logs::create_match_log),
        )
        .route(
            "/api/match-logs/by-date",
            get(handlers::match_logs::list_match_logs_by_date),
        )
        .route(
            "/api/match-logs/analyze/:log_id",
            get(handlers::match_logs::get_match_analysis),
        )
        .route(
            "/api/match-logs/:id",
            delete(handlers::match_logs::delete_match_log),
        )
        // Injury and rehab logs
        .route(
            "/api/injury-logs",
            get(handlers::injury_logs::list_injury_logs)
                .post(handlers::injury_logs::create_injury_log),
        )
        .route(
            "/api/injury-logs/by-date",
            get(handlers::injury_logs::list_injury_logs_by_date),
        )
        .route(
            "/api/injury-logs/analyze/:log_id",
            get(handlers::injury_logs::get_rehab_analysis),
        )
        .route(
            "/api/injury-logs/:id",
            put(handlers::injury_logs::update_injury_log)
                .delete(handlers::injury_logs::delete_injury_log),
        )
        // Training analysis history
        .route("/api/ai/user", get(handlers::ai::list_my_analyses))
        // Routines
        .route("/api/routines", get(handlers::routines::list_my_routines))
        .route("/api/routines/catalog", get(handlers::routines::catalog))
        .route("/api/routines/add", post(handlers::routines::add_routine))
        .route(
            "/api/routines/:routine_id",
            delete(handlers::routines::remove_routine),
        )
        .merge(ai_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::jwt::create_access_token;
    use crate::auth::rate_limit::RateLimiter;
    use crate::services::analyzer::TrainingAnalyzer;
    use crate::services::coach::CoachClient;

    /// Router over a pool that never connects. Only requests rejected before
    /// the first query can be exercised.
    fn test_app() -> (Router, Arc<Config>) {
        let config = Arc::new(Config::for_tests());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let state = AppState {
            db,
            config: config.clone(),
            coach: CoachClient::new(&config).unwrap(),
            analyzer: TrainingAnalyzer::new(&config).unwrap(),
            rate_limiter: RateLimiter::new(),
        };
        (build_router(state), config)
    }

    fn bearer(config: &Config) -> String {
        let token = create_access_token(1, "runner", config).unwrap();
        format!("Bearer {}", token.access_token)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "trainlog-api");
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/api/injury-logs").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 401);
    }

    #[tokio::test]
    async fn test_invalid_token_is_403() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                Request::get("/api/training-logs")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_rehab_without_parent_is_rejected() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json(
                "/api/injury-logs",
                Some(&auth),
                json!({ "log_type": "rehab", "rehab_content": "band work" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("parent_injury_id"));
    }

    #[tokio::test]
    async fn test_injury_with_rehab_fields_is_rejected() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json(
                "/api/injury-logs",
                Some(&auth),
                json!({ "log_type": "injury", "injury_part": "ankle", "rehab_feedback": "ok" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_by_date_requires_valid_date() {
        let (app, config) = test_app();
        let auth = bearer(&config);

        for uri in [
            "/api/injury-logs/by-date",
            "/api/training-logs/by-date?date=2024-13-01",
            "/api/match-logs/by-date?date=yesterday",
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::get(uri)
                        .header(header::AUTHORIZATION, &auth)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let (app, _) = test_app();
        let response = app
            .oneshot(post_json(
                "/api/users/signup",
                None,
                json!({ "login_id": "ab", "password": "short", "name": "Kim" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("login_id"));
        assert!(message.contains("password"));
    }

    #[tokio::test]
    async fn test_training_analysis_needs_content() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json(
                "/api/ai/analyze",
                Some(&auth),
                json!({ "training_content": "   " }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ai_routes_require_auth_before_rate_limit() {
        let (app, _) = test_app();
        let response = app
            .oneshot(post_json(
                "/api/match-logs/analyze",
                None,
                json!({ "match_log_id": 1 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_routes_are_rate_limited() {
        let (app, _) = test_app();
        let mut last = StatusCode::OK;
        for _ in 0..6 {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/users/signup",
                    None,
                    json!({ "login_id": "x", "password": "y", "name": "z" }),
                ))
                .await
                .unwrap();
            last = response.status();
        }

        assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_unknown_log_type_is_400_with_error_body() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json(
                "/api/injury-logs",
                Some(&auth),
                json!({ "log_type": "training" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("log_type"));
    }

    #[tokio::test]
    async fn test_rehab_analysis_without_log_id_is_400() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json("/api/injury-logs/analyze", Some(&auth), json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_400() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(
                Request::delete("/api/training-logs/latest")
                    .header(header::AUTHORIZATION, &auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_nested_pain_violation_names_the_field() {
        let (app, config) = test_app();
        let auth = bearer(&config);
        let response = app
            .oneshot(post_json(
                "/api/training-logs",
                Some(&auth),
                json!({
                    "intensity": 3,
                    "immersion": 4,
                    "achievement": 2,
                    "weather": "cloudy",
                    "pain_ankle": 14
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "pain_ankle: is invalid");
    }
}
