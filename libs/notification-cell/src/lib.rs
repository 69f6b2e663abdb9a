pub mod models;
pub mod services;

pub use models::*;
pub use services::dispatcher::{HttpDispatcher, NotificationDispatcher};
pub use services::outbox::{notification_channel, spawn_dispatcher, NotificationOutbox};
