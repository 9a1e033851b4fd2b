pub mod anomaly_handlers;
pub mod audit_handlers;
pub mod dashboard_handlers;
pub mod ledger_handlers;
pub mod ops_handlers;

pub use anomaly_handlers::*;
pub use audit_handlers::*;
pub use dashboard_handlers::*;
pub use ledger_handlers::*;
pub use ops_handlers::*;
