pub mod classifier_service;
pub mod health_service;
pub mod scheduler_service;

pub use classifier_service::*;
pub use health_service::*;
pub use scheduler_service::*;
