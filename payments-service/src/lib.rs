//! Payments service library: the Ledger, its HTTP surface, the Inbox
//! Consumer loop, and the outbox-backed result publish path (§4.3).

pub mod config;
pub mod handlers;
pub mod inbox_consumer;
pub mod ledger;
pub mod metrics;
pub mod models;

pub use config::Config;
pub use inbox_consumer::InboxConsumerLoop;
pub use ledger::Ledger;
