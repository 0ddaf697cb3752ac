//! Prometheus metrics for database connection pool
//!
//! Tracks pool size, connection acquisition latency, and errors

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::fmt;
use std::time::Instant;

lazy_static::lazy_static! {
    /// Database connection pool size by state (idle/active/max)
    static ref DB_POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Time to acquire a connection from the pool
    static ref DB_POOL_ACQUIRE_DURATION: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_duration_seconds",
        "Time to acquire connection from pool",
        &["service"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Connection acquisition errors by type
    static ref DB_POOL_CONNECTION_ERRORS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connection_errors_total",
        "Connection acquisition errors",
        &["service", "error_type"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Requests rejected by `acquire_with_backpressure` before they ever hit the pool
    static ref DB_POOL_BACKPRESSURE_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "db_pool_backpressure_rejections_total",
        "Connection acquisitions rejected by pool backpressure",
        &["service"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Update connection pool metrics (called periodically)
pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;
    let active = size - idle;

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "idle"])
        .set(idle);

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "active"])
        .set(active);

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "max"])
        .set(pool.options().get_max_connections() as i64);
}

/// Acquire a connection from the pool and record metrics
///
/// This is a drop-in replacement for `pool.acquire().await` that automatically
/// tracks acquisition latency and error rates.
///
/// # Example
/// ```no_run
/// # use db_pool::{create_pool, DbConfig, acquire_with_metrics};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = create_pool(DbConfig::for_service("test")).await?;
/// let conn = acquire_with_metrics(&pool, "my-service").await?;
/// sqlx::query("SELECT 1").execute(&mut *conn).await?;
/// # Ok(())
/// # }
/// ```
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let start = Instant::now();
    let result = pool.acquire().await;

    DB_POOL_ACQUIRE_DURATION
        .with_label_values(&[service])
        .observe(start.elapsed().as_secs_f64());

    if let Err(e) = &result {
        let error_type = match e {
            sqlx::Error::PoolTimedOut => "timeout",
            sqlx::Error::PoolClosed => "closed",
            _ => "other",
        };

        DB_POOL_CONNECTION_ERRORS
            .with_label_values(&[service, error_type])
            .inc();
    }

    result
}

/// Pool utilization threshold beyond which `acquire_with_backpressure` rejects
/// new requests rather than queueing them.
#[derive(Debug, Clone, Copy)]
pub struct BackpressureConfig {
    pub threshold: f64,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self { threshold: 0.85 }
    }
}

impl BackpressureConfig {
    pub fn from_env() -> Self {
        let threshold = std::env::var("DB_POOL_BACKPRESSURE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|t| *t > 0.0 && *t <= 1.0)
            .unwrap_or_else(|| Self::default().threshold);
        Self { threshold }
    }
}

/// Returned by [`acquire_with_backpressure`] when the pool is already above
/// its configured utilization threshold.
#[derive(Debug, Clone)]
pub struct PoolExhaustedError {
    pub service: String,
    pub utilization: f64,
    pub threshold: f64,
}

impl fmt::Display for PoolExhaustedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool for {} at {:.2}% utilization exceeds {:.2}% backpressure threshold",
            self.service,
            self.utilization * 100.0,
            self.threshold * 100.0
        )
    }
}

impl std::error::Error for PoolExhaustedError {}

/// Error from [`acquire_with_backpressure`]: either the pool was rejected
/// upfront for being over threshold, or the underlying acquire itself failed.
#[derive(Debug, thiserror::Error)]
pub enum BackpressureError {
    #[error(transparent)]
    Exhausted(#[from] PoolExhaustedError),
    #[error(transparent)]
    Acquire(#[from] sqlx::Error),
}

/// Acquire a connection, rejecting upfront if the pool is already above
/// `threshold` utilization instead of queueing behind it. Prefer this over
/// `acquire_with_metrics` on request paths where failing fast beats a slow
/// queue (e.g. HTTP handlers, as opposed to the Outbox Dispatcher's own
/// background polling loop).
pub async fn acquire_with_backpressure(
    pool: &PgPool,
    service: &str,
    threshold: f64,
) -> Result<PoolConnection<Postgres>, BackpressureError> {
    let max = pool.options().get_max_connections() as f64;
    let size = pool.size() as f64;
    let utilization = if max > 0.0 { size / max } else { 0.0 };

    if utilization >= threshold {
        DB_POOL_BACKPRESSURE_REJECTIONS
            .with_label_values(&[service])
            .inc();
        return Err(PoolExhaustedError {
            service: service.to_string(),
            utilization,
            threshold,
        }
        .into());
    }

    Ok(pool.acquire().await?)
}
