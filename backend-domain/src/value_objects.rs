// Domain value objects
pub mod anomaly_status;
pub mod anomaly_type;
pub mod audit_action;
pub mod severity;

pub use anomaly_status::*;
pub use anomaly_type::*;
pub use audit_action::*;
pub use severity::*;
