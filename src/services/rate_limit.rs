use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde_json::json;
use std::{future::Future, num::NonZeroU32, pin::Pin, sync::Arc};
use tower::{Layer, Service};

pub type CredentialRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Limiter for the credential endpoints (login, register, OTP, password reset).
/// `burst` requests go through immediately, then the bucket refills at
/// `per_minute` requests per minute.
pub fn create_rate_limiter(burst: u32, per_minute: u32) -> CredentialRateLimiter {
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    let refill = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);

    // `per_minute` tokens per minute refill, with burst capacity
    Arc::new(RateLimiter::direct(Quota::per_minute(refill).allow_burst(burst)))
}

#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: CredentialRateLimiter,
}

impl RateLimitLayer {
    pub fn new(limiter: CredentialRateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: CredentialRateLimiter,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Bucket empty: answer here, the handler never runs
            if limiter.check().is_err() {
                tracing::warn!(path = %request.uri().path(), "credential endpoint rate limited");
                return Ok((
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "success": false,
                        "error": "Too many attempts, please wait a minute and try again"
                    })),
                )
                    .into_response());
            }
            // Token taken, pass through
            inner.call(request).await
        })
    }
}
