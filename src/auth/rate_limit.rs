use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::AppState;

/// Fixed-window request quota.
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    pub max_requests: u32,
    pub window: Duration,
}

/// Signup and login, per client IP.
pub const AUTH_QUOTA: Quota = Quota {
    max_requests: 5,
    window: Duration::from_secs(60),
};

/// AI analysis calls, per user. Each one costs an upstream model request.
pub const AI_QUOTA: Quota = Quota {
    max_requests: 20,
    window: Duration::from_secs(3600),
};

/// In-memory limiter shared by every worker of a single instance.
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

struct Window {
    count: u32,
    started: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against `key`. Returns the remaining budget, or the
    /// time until the window resets when the quota is spent.
    pub async fn hit(&self, key: &str, quota: Quota) -> Result<u32, Duration> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) > quota.window {
            window.count = 0;
            window.started = now;
        }

        if window.count >= quota.max_requests {
            return Err(quota
                .window
                .saturating_sub(now.duration_since(window.started)));
        }

        window.count += 1;
        Ok(quota.max_requests - window.count)
    }

    /// Drop windows that ended more than `max_age` ago.
    pub async fn prune(&self, max_age: Duration) {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        windows.retain(|_, w| now.duration_since(w.started) < max_age);
    }
}

/// Background task that keeps the limiter map from growing without bound.
pub fn spawn_prune_worker(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            limiter.prune(AI_QUOTA.window * 2).await;
        }
    });
}

fn client_ip(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into())
}

/// Per-IP limit for the public auth endpoints.
pub async fn limit_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&req);
    let path = req.uri().path().to_string();
    // Separate budgets for /signup and /login.
    let key = format!("auth:{}:{}", ip, path);

    match state.rate_limiter.hit(&key, AUTH_QUOTA).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining, "Auth rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = retry_after.as_secs(),
                "Auth rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

/// Per-user limit for AI analysis endpoints. Must run inside `require_auth`.
pub async fn limit_ai(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .extensions()
        .get::<AuthUser>()
        .map(|u| u.id)
        .ok_or(AppError::MissingToken)?;
    let key = format!("ai:{}", user_id);

    match state.rate_limiter.hit(&key, AI_QUOTA).await {
        Ok(remaining) => {
            tracing::debug!(user_id, remaining, "AI rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                user_id,
                retry_after_secs = retry_after.as_secs(),
                "AI rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}
