// Domain entities

pub mod anomaly;
pub mod audit;
pub mod budget;
pub mod evidence;
pub mod health;
pub mod model;
pub mod transaction;

pub use anomaly::*;
pub use audit::*;
pub use budget::*;
pub use evidence::*;
pub use health::*;
pub use model::*;
pub use transaction::*;
