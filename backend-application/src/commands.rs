pub mod budget_commands;
pub mod detect_commands;
pub mod resolve_commands;
pub mod transaction_commands;
