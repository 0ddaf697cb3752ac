//! Orders service library: the Order Writer HTTP API and its outbox-backed
//! publish path (§4.1).

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod order_service;
pub mod status_consumer;

pub use config::Config;
pub use order_service::OrderService;
pub use status_consumer::StatusConsumer;
