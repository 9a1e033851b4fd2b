// Audit action value object (resource_verb pairs)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ExpenseCreate,
    IncomeCreate,
    BudgetCreate,
    BudgetUpdate,
    AuthLogin,
    AuthLogout,
    AnomalyResolve,
    AnomalyLeakScan,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ExpenseCreate => "EXPENSE_CREATE",
            AuditAction::IncomeCreate => "INCOME_CREATE",
            AuditAction::BudgetCreate => "BUDGET_CREATE",
            AuditAction::BudgetUpdate => "BUDGET_UPDATE",
            AuditAction::AuthLogin => "AUTH_LOGIN",
            AuditAction::AuthLogout => "AUTH_LOGOUT",
            AuditAction::AnomalyResolve => "ANOMALY_RESOLVE",
            AuditAction::AnomalyLeakScan => "ANOMALY_LEAK_SCAN",
        }
    }
}
