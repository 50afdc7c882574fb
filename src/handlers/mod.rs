mod chat;
mod config;
mod health;
mod metrics;
mod reset;

pub use chat::chat_handler;
pub use config::config_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use reset::reset_handler;
