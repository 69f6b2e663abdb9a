pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod signature;

pub use models::*;
pub use services::reconcile::ReconciliationService;
