//! Monthly spending limits per category.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_budget_table, delete_budget, get_budget, get_budgets, get_budgets_for_month,
    upsert_budget,
};
pub use domain::{Budget, BudgetForm, BudgetId, BudgetWrite, NewBudget};
pub use endpoints::{delete_budget_endpoint, get_budgets_endpoint, upsert_budget_endpoint};
