pub mod anomaly_store;
pub mod audit_store;
pub mod ledger_store;

pub use anomaly_store::*;
pub use audit_store::*;
pub use ledger_store::*;
