use std::time::{Duration, Instant};

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpResponse, HttpServer};
use actix_cors::Cors;
use chrono::Utc;
use dotenv::dotenv;
use log::{error, info, warn};
use serde_json::json;

mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod utils;

use config::AppConfig;
use models::ErrorResponse;
use services::{MailService, MongoDBService};
use utils::rate_limit::{self, RateLimiter};

// Fixed window, applied uniformly at the gateway
const RATE_LIMIT_MAX_REQUESTS: u32 = 100;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

struct ServerStart(Instant);

async fn health(
    mongodb: web::Data<MongoDBService>,
    start: web::Data<ServerStart>,
) -> HttpResponse {
    let db_connected = mongodb.ping().await;
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "dbState": if db_connected { "connected" } else { "disconnected" },
        "timestamp": Utc::now().to_rfc3339(),
        "uptimeSecs": start.0.elapsed().as_secs(),
    }))
}

async fn root(config: web::Data<AppConfig>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Coupon API Server is running",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": config.environment,
        "endpoints": {
            "health": "/health",
            "coupons": "/api/coupons",
        },
    }))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::message(
        "Route not found. Please check the URL and HTTP method.",
    ))
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    let config = AppConfig::load()?;
    env_logger::init_from_env(
        env_logger::Env::new().default_filter_or(config.log_level.clone()),
    );

    // Last-resort safeguard: a panic anywhere still lands in the log before
    // the runtime tears the task down.
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Unhandled panic: {}", panic_info);
    }));

    let mongodb = match MongoDBService::init(&config.mongodb_uri).await {
        Ok(mongodb) => mongodb,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            return Err(e.into());
        }
    };
    let mongodb_data = web::Data::new(mongodb);

    if config.mail_user.is_empty() {
        warn!("MAIL_USER is empty - mail dispatch will fail until configured");
    }
    let mail_service = MailService::new(&config.smtp_relay, &config.mail_user, &config.mail_pass)?;
    let mail_data = web::Data::new(mail_service);

    let rate_limiter = web::Data::new(RateLimiter::new(
        RATE_LIMIT_MAX_REQUESTS,
        RATE_LIMIT_WINDOW,
    ));

    // Prune client windows that have elapsed so the limiter map stays bounded
    {
        let limiter = rate_limiter.clone();
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(RATE_LIMIT_WINDOW);
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }

    let server_start = web::Data::new(ServerStart(Instant::now()));
    let config_data = web::Data::new(config.clone());

    info!(
        "Starting server at http://{}:{} ({})",
        config.host, config.port, config.environment
    );
    if !config.is_production() {
        info!("Non-production environment: 500 responses include error details");
    }

    let bind_addr = (config.host.clone(), config.port);
    HttpServer::new(move || {
        // Origin allow-list; blocked origins are logged and refused
        let allowed_origins = config.allowed_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let allowed = origin
                    .to_str()
                    .map(|o| allowed_origins.iter().any(|a| a == o))
                    .unwrap_or(false);
                if !allowed {
                    warn!("Blocked by CORS: {:?}", origin);
                }
                allowed
            })
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        // CORS wraps the limiter so 429 responses still carry CORS headers
        App::new()
            .wrap(from_fn(rate_limit::enforce))
            .wrap(cors)
            .app_data(rate_limiter.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let message = format!("Invalid request body: {}", err);
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(ErrorResponse::message(message)),
                )
                .into()
            }))
            .app_data(mongodb_data.clone())
            .app_data(mail_data.clone())
            .app_data(config_data.clone())
            .app_data(server_start.clone())
            .configure(routes::configure)
            .route("/health", web::get().to(health))
            .route("/", web::get().to(root))
            .default_service(web::route().to(not_found))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    // actix drains in-flight requests on SIGTERM/SIGINT before we get here
    info!("Server shut down");
    Ok(())
}
