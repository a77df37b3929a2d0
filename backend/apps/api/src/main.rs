//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are rendered by
//! the coupon crate.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use coupon::domain::repository::CouponRepository;
use coupon::domain::services::seed_codes;
use coupon::{CooldownTracker, CouponConfig, PgCouponRepository, coupon_router};
use platform::clock::{Clock, SystemClock};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 3001;
// One year
const MAX_COOLDOWN_SECS: u64 = 365 * 24 * 60 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,coupon=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let coupon_config = load_coupon_config()?;
    let coupon_repo =
        PgCouponRepository::new(pool.clone()).with_max_attempts(coupon_config.reserve_max_attempts);

    // Startup seeding: an empty pool gets COUPON1..COUPONn
    // Errors here should not prevent server startup
    if let Err(e) = coupon_repo
        .seed_if_empty(&seed_codes(coupon_config.seed_coupon_count))
        .await
    {
        tracing::warn!(
            error = %e,
            "Coupon seeding failed, continuing anyway"
        );
    }

    // Cooldown state lives in process memory; expired entries are swept
    // once per window
    let cooldowns = Arc::new(CooldownTracker::new());
    spawn_cooldown_sweeper(cooldowns.clone(), coupon_config.cooldown_window);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", coupon_router(coupon_repo, cooldowns, coupon_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env_or("PORT", DEFAULT_PORT)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Coupon configuration from the environment.
///
/// Debug builds mint a random token secret and drop the Secure cookie flag;
/// release builds require `CLAIM_TOKEN_SECRET` (base64, 32 bytes).
fn load_coupon_config() -> anyhow::Result<CouponConfig> {
    let base = if cfg!(debug_assertions) {
        CouponConfig::development()
    } else {
        let secret_b64 = env::var("CLAIM_TOKEN_SECRET")
            .context("CLAIM_TOKEN_SECRET must be set in production")?;
        let secret_bytes = platform::crypto::from_base64(secret_b64.trim())
            .context("CLAIM_TOKEN_SECRET is not valid base64")?;
        let token_secret: [u8; 32] = secret_bytes
            .as_slice()
            .try_into()
            .context("CLAIM_TOKEN_SECRET must decode to exactly 32 bytes")?;
        CouponConfig {
            token_secret,
            ..CouponConfig::default()
        }
    };

    let cooldown_secs: u64 = env_or("CLAIM_COOLDOWN_SECS", base.cooldown_window.as_secs())?;
    anyhow::ensure!(
        cooldown_secs <= MAX_COOLDOWN_SECS,
        "CLAIM_COOLDOWN_SECS must be at most {MAX_COOLDOWN_SECS}, got {cooldown_secs}"
    );
    let seed_coupon_count: u32 = env_or("SEED_COUPON_COUNT", base.seed_coupon_count)?;

    Ok(CouponConfig {
        cooldown_window: Duration::from_secs(cooldown_secs),
        seed_coupon_count,
        ..base
    })
}

/// Parse an optional environment variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn spawn_cooldown_sweeper(cooldowns: Arc<CooldownTracker>, window: Duration) {
    let period = window.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let clock = SystemClock;
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = cooldowns.evict_expired(clock.now_ms(), window);
            if evicted > 0 {
                tracing::debug!(evicted, remaining = cooldowns.len(), "Expired cooldowns evicted");
            }
        }
    });
}
