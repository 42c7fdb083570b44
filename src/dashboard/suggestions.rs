//! Short spending advice derived from budgets and last month's spending.

use serde::{Deserialize, Serialize};

use crate::dashboard::{DashboardSummary, ExpenseBreakdown};

/// Spending on a budget at or above this share of the limit gets a warning.
const NEAR_LIMIT_RATIO: f64 = 0.9;
/// Spending in a category this many times last month's is flagged as unusual.
const UNUSUAL_SPENDING_RATIO: f64 = 1.2;

/// The JSON body returned by `GET /suggestions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    /// Human readable advice, most urgent first.
    pub suggestions: Vec<String>,
}

/// Build advice for the month in `summary`, comparing spending with `previous_month`.
pub fn build_suggestions(
    summary: &DashboardSummary,
    previous_month: &[ExpenseBreakdown],
) -> Vec<String> {
    let mut suggestions = Vec::new();

    for budget in &summary.budget_vs_actual {
        if budget.is_over_budget() {
            suggestions.push(format!(
                "You have exceeded your {} budget by ${:.2}.",
                budget.category,
                budget.spent - budget.limit
            ));
        } else if budget.limit > 0.0 && budget.spent >= budget.limit * NEAR_LIMIT_RATIO {
            suggestions.push(format!(
                "You have used {:.0}% of your {} budget.",
                budget.spent / budget.limit * 100.0,
                budget.category
            ));
        }
    }

    if summary.total_expenses > summary.total_income {
        suggestions.push("Your expenses this month are higher than your income.".to_owned());
    }

    for current in &summary.expense_breakdown {
        let previous = previous_month
            .iter()
            .find(|previous| previous.category == current.category)
            .map_or(0.0, |previous| previous.amount);

        if previous > 0.0 && current.amount > previous * UNUSUAL_SPENDING_RATIO {
            suggestions.push(format!(
                "You've spent more than usual on {}.",
                current.category
            ));
        }
    }

    suggestions
}

#[cfg(test)]
mod suggestions_tests {
    use crate::dashboard::{BudgetVsActual, DashboardSummary, ExpenseBreakdown, build_suggestions};

    fn summary() -> DashboardSummary {
        DashboardSummary {
            total_income: 1000.0,
            total_expenses: 0.0,
            balance: 1000.0,
            expense_breakdown: vec![],
            trend_data: vec![],
            budget_vs_actual: vec![],
        }
    }

    fn breakdown(category: &str, amount: f64) -> ExpenseBreakdown {
        ExpenseBreakdown {
            category: category.to_owned(),
            amount,
        }
    }

    #[test]
    fn quiet_month_has_no_suggestions() {
        assert!(build_suggestions(&summary(), &[]).is_empty());
    }

    #[test]
    fn over_and_near_budget_are_reported() {
        let summary = DashboardSummary {
            budget_vs_actual: vec![
                BudgetVsActual {
                    category: "Food".to_owned(),
                    limit: 100.0,
                    spent: 120.0,
                },
                BudgetVsActual {
                    category: "Rent".to_owned(),
                    limit: 100.0,
                    spent: 95.0,
                },
                BudgetVsActual {
                    category: "Fun".to_owned(),
                    limit: 100.0,
                    spent: 10.0,
                },
            ],
            ..summary()
        };

        let suggestions = build_suggestions(&summary, &[]);

        assert_eq!(
            suggestions,
            vec![
                "You have exceeded your Food budget by $20.00.",
                "You have used 95% of your Rent budget.",
            ]
        );
    }

    #[test]
    fn spending_above_income_is_reported() {
        let summary = DashboardSummary {
            total_income: 100.0,
            total_expenses: 150.0,
            balance: -50.0,
            ..summary()
        };

        let suggestions = build_suggestions(&summary, &[]);

        assert_eq!(
            suggestions,
            vec!["Your expenses this month are higher than your income."]
        );
    }

    #[test]
    fn unusual_category_spending_is_reported() {
        let summary = DashboardSummary {
            total_expenses: 200.0,
            expense_breakdown: vec![breakdown("Dining", 130.0), breakdown("Food", 70.0)],
            ..summary()
        };

        let suggestions =
            build_suggestions(&summary, &[breakdown("Dining", 100.0), breakdown("Food", 80.0)]);

        assert_eq!(suggestions, vec!["You've spent more than usual on Dining."]);
    }

    #[test]
    fn category_without_history_is_not_unusual() {
        let summary = DashboardSummary {
            total_expenses: 500.0,
            expense_breakdown: vec![breakdown("Travel", 500.0)],
            ..summary()
        };

        assert!(build_suggestions(&summary, &[]).is_empty());
    }
}
