use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use db_pool::DbConfig;
use payments_service::config::Config;
use payments_service::handlers;
use payments_service::ledger::Ledger;
use payments_service::metrics::{serve_metrics, MetricsMiddleware};
use payments_service::InboxConsumerLoop;
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

    tracing::info!("Starting payments-service");

    let config = Config::from_env();

    let db_config = DbConfig::for_service("payments-service");
    db_config.log_config();
    let pool = db_pool::create_pool(db_config)
        .await
        .expect("failed to create payments-service database pool");

    db_pool::migrate(&pool, "./migrations")
        .await
        .expect("failed to run payments-service migrations");

    let broker_conn = broker::Broker::connect(&config.broker)
        .await
        .expect("failed to connect to broker");

    // Outbox Dispatcher: publishes PAYMENT_RESULT events produced by the
    // Inbox Consumer below.
    let outbox_publisher_channel = broker::Publisher::new(&broker_conn)
        .await
        .expect("failed to open broker publisher channel");
    let outbox_repository = Arc::new(SqlxOutboxRepository::new(pool.clone()));
    let outbox_publisher = Arc::new(AmqpOutboxPublisher::new(outbox_publisher_channel));
    let outbox_metrics = OutboxMetrics::new("payments_service");

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

    // Inbox Consumer: drains `payment.requests`, debits the ledger.
    let ledger = Ledger::new(pool.clone());
    let inbox_queue_consumer = broker::Consumer::new(&broker_conn, "payment.requests", "payments-service")
        .await
        .expect("failed to start payment.requests consumer");

    let mut inbox_loop = InboxConsumerLoop::new(pool.clone(), ledger.clone(), inbox_queue_consumer);
    tokio::spawn(async move {
        inbox_loop.run().await;
    });

    let ledger_data = web::Data::new(ledger);
    let service_port = config.service_port;

    tracing::info!(port = service_port, "payments-service starting");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(MetricsMiddleware)
            .app_data(ledger_data.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(serve_metrics))
            .route("/api/accounts", web::post().to(handlers::create_account))
            .route("/api/accounts/{user_id}/deposit", web::post().to(handlers::deposit))
            .route("/api/accounts/{user_id}/balance", web::get().to(handlers::get_balance))
    })
    .bind(("0.0.0.0", service_port))?
    .run()
    .await
}
