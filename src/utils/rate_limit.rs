//! Gateway-level fixed-window rate limiting, keyed on client identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};

use crate::models::ErrorResponse;

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window counter per client. The window resets wholesale when it
/// elapses; there is no sliding behavior.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<String, WindowEntry>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        RateLimiter {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        let entry = map.entry(client.to_owned()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }

    /// Remove entries whose window has fully elapsed, so the map does not
    /// grow with every client address ever seen. Called on a timer.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, entry| now.duration_since(entry.window_start) < self.window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Client identity for rate limiting: first X-Forwarded-For entry when
/// present (the service runs behind a trusted proxy), else the peer address.
pub fn client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Gateway middleware enforcing the limiter registered in app data. Over
/// the limit, the request is answered with 429 and the error envelope.
pub async fn enforce(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    if let Some(limiter) = req.app_data::<web::Data<RateLimiter>>().cloned() {
        let ip = client_ip(&req);
        if !limiter.check(&ip) {
            log::warn!("Rate limit exceeded for {}", ip);
            let res = req.into_response(HttpResponse::TooManyRequests().json(
                ErrorResponse::message("Too many requests, please try again later."),
            ));
            return Ok(res);
        }
    }
    next.call(req)
        .await
        .map(ServiceResponse::map_into_boxed_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_cors::Cors;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, App};

    #[::core::prelude::v1::test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[::core::prelude::v1::test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
        assert!(limiter.check("5.6.7.8"));
    }

    #[::core::prelude::v1::test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("1.2.3.4", start));
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(30)));
        // New window once the old one has fully elapsed
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(60)));
    }

    #[::core::prelude::v1::test]
    fn test_cleanup_drops_stale_clients() {
        let limiter = RateLimiter::new(100, Duration::from_secs(900));
        let start = Instant::now();
        for i in 0..10_000 {
            limiter.check_at(&format!("10.0.{}.{}", i / 256, i % 256), start);
        }
        assert_eq!(limiter.tracked_clients(), 10_000);

        limiter.cleanup_at(start + Duration::from_secs(3600));
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[::core::prelude::v1::test]
    fn test_cleanup_keeps_live_windows() {
        let limiter = RateLimiter::new(100, Duration::from_secs(900));
        let start = Instant::now();
        limiter.check_at("old-client", start);
        limiter.check_at("new-client", start + Duration::from_secs(880));

        limiter.cleanup_at(start + Duration::from_secs(901));
        assert_eq!(limiter.tracked_clients(), 1);
        // The surviving window still counts requests
        assert!(limiter.check_at("new-client", start + Duration::from_secs(902)));
    }

    #[actix_web::test]
    async fn test_limited_response_carries_cors_headers() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        // Same wrapping order as the composition root: CORS outside the limiter
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(limiter))
                .wrap(from_fn(enforce))
                .wrap(cors)
                .route(
                    "/ping",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let request = || {
            test::TestRequest::get()
                .uri("/ping")
                .insert_header(("Origin", "http://localhost:3000"))
                .insert_header(("X-Forwarded-For", "9.9.9.9"))
                .to_request()
        };

        let first = test::call_service(&app, request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = test::call_service(&app, request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
