// Domain services: rules, detection, scoring

pub mod detection_engine;
pub mod health_scorer;
pub mod rules;

pub use detection_engine::*;
pub use health_scorer::*;
pub use rules::*;
