pub mod anomaly_queries;
pub mod audit_queries;
pub mod dashboard_queries;
