use actix::Actor;
use actix_web::{web, App, HttpServer};
use notification_service::config::Config;
use notification_service::handlers;
use notification_service::metrics::{serve_metrics, MetricsMiddleware};
use notification_service::{NotificationHub, ResultConsumer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    tracing::info!("Starting notification-service");

    let config = Config::from_env();

    let hub = NotificationHub::new().start();

    let broker_conn = broker::Broker::connect(&config.broker)
        .await
        .expect("failed to connect to broker");
    // Binds its own queue to the `payment.results` fanout exchange so it
    // gets every result independently of orders-service's status consumer,
    // instead of the two competing for a single shared queue.
    let results_consumer = broker::Consumer::new_fanout(
        &broker_conn,
        broker::PAYMENT_RESULTS_EXCHANGE,
        "payment.results.notify",
        "notification-service",
    )
    .await
    .expect("failed to start payment.results consumer");

    let mut result_consumer = ResultConsumer::new(hub.clone(), results_consumer);
    tokio::spawn(async move {
        result_consumer.run().await;
    });

    let hub_data = web::Data::new(hub);
    let ws_host = config.ws_host.clone();
    let ws_port = config.ws_port;

    tracing::info!(host = %ws_host, port = ws_port, "notification-service starting");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(MetricsMiddleware)
            .app_data(hub_data.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(serve_metrics))
            .route("/ws", web::get().to(handlers::ws_connect))
    })
    .bind((ws_host, ws_port))?
    .run()
    .await
}
