use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use db_pool::DbConfig;
use orders_service::config::Config;
use orders_service::handlers;
use orders_service::metrics::{serve_metrics, MetricsMiddleware};
use orders_service::order_service::OrderService;
use orders_service::StatusConsumer;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transactional_outbox::{metrics::OutboxMetrics, AmqpOutboxPublisher, OutboxProcessor, SqlxOutboxRepository};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting orders-service");

    let config = Config::from_env();

    let db_config = DbConfig::for_service("orders-service");
    db_config.log_config();
    let pool = db_pool::create_pool(db_config)
        .await
        .expect("failed to create orders-service database pool");

    db_pool::migrate(&pool, "./migrations")
        .await
        .expect("failed to run orders-service migrations");

    let broker = broker::Broker::connect(&config.broker)
        .await
        .expect("failed to connect to broker");
    let publisher = broker::Publisher::new(&broker)
        .await
        .expect("failed to open broker publisher channel");

    let outbox_repository = Arc::new(SqlxOutboxRepository::new(pool.clone()));
    let outbox_publisher = Arc::new(AmqpOutboxPublisher::new(publisher));
    let outbox_metrics = OutboxMetrics::new("orders_service");

    let processor = OutboxProcessor::new_with_metrics(
        outbox_repository,
        outbox_publisher,
        outbox_metrics,
        config.outbox_batch_size,
        Duration::from_secs(config.outbox_poll_interval_secs),
    );

    tokio::spawn(async move {
        if let Err(e) = processor.start().await {
            tracing::error!(error = ?e, "outbox processor exited");
        }
    });

    // Order Status Consumer: drains its own queue bound to the
    // `payment.results` fanout exchange and applies the
    // NEW -> FINISHED/CANCELLED transition (Invariant 6). This is the only
    // component that owns the `orders` table, so it is the only component
    // that can apply this mutation. Notification-service binds a separate
    // queue to the same exchange, so each service gets every result instead
    // of the two competing for a single shared queue.
    let status_results_consumer = broker::Consumer::new_fanout(
        &broker,
        broker::PAYMENT_RESULTS_EXCHANGE,
        "payment.results.orders",
        "orders-service",
    )
    .await
    .expect("failed to start payment.results consumer");
    let mut status_consumer =
        StatusConsumer::new(OrderService::new(pool.clone()), status_results_consumer);
    tokio::spawn(async move {
        status_consumer.run().await;
    });

    let order_service = web::Data::new(OrderService::new(pool.clone()));
    let service_port = config.service_port;

    tracing::info!(port = service_port, "orders-service starting");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(MetricsMiddleware)
            .app_data(order_service.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(serve_metrics))
            .route("/api/orders", web::post().to(handlers::create_order))
            .route("/api/orders", web::get().to(handlers::list_orders))
            .route("/api/orders/{id}", web::get().to(handlers::get_order))
    })
    .bind(("0.0.0.0", service_port))?
    .run()
    .await
}
