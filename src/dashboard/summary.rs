//! The dashboard summary and the queries that build it.

use std::ops::Range;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, TransactionType, UserID,
    budget::get_budgets_for_month,
    dashboard::aggregation::{month_range, running_balance},
};

/// Total spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    /// The category name.
    pub category: String,
    /// The sum of the category's expenses.
    pub amount: f64,
}

/// The balance at the end of a day with transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The day.
    pub date: Date,
    /// Income minus expenses from the start of the month up to and including `date`.
    pub balance: f64,
}

/// How much was spent against one budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetVsActual {
    /// The category name.
    pub category: String,
    /// The budget's monthly limit.
    pub limit: f64,
    /// The sum of the category's expenses this month.
    pub spent: f64,
}

impl BudgetVsActual {
    /// Whether spending strictly exceeds the limit.
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.limit
    }
}

/// A summary of the current month. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// The sum of this month's income.
    pub total_income: f64,
    /// The sum of this month's expenses.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub balance: f64,
    /// Spending per category, ordered by category name.
    pub expense_breakdown: Vec<ExpenseBreakdown>,
    /// The running balance, one point per day with transactions.
    pub trend_data: Vec<TrendPoint>,
    /// This month's budgets with the amount spent, ordered by category name.
    pub budget_vs_actual: Vec<BudgetVsActual>,
}

/// Build the summary for the month containing `today`.
pub fn get_dashboard_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let range = month_range(today);

    let (total_income, total_expenses) = get_totals(user_id, &range, connection)?;
    let expense_breakdown = get_expense_breakdown(user_id, &range, connection)?;
    let trend_data = running_balance(&get_daily_net(user_id, &range, connection)?);
    let budget_vs_actual = get_budget_vs_actual(user_id, today, &expense_breakdown, connection)?;

    Ok(DashboardSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        expense_breakdown,
        trend_data,
        budget_vs_actual,
    })
}

fn get_totals(
    user_id: UserID,
    range: &Range<Date>,
    connection: &Connection,
) -> Result<(f64, f64), Error> {
    let mut statement = connection.prepare(
        "SELECT type, SUM(amount) FROM \"transaction\"
         WHERE user_id = ?1 AND date >= ?2 AND date < ?3
         GROUP BY type",
    )?;
    let rows = statement.query_map((user_id.as_i64(), range.start, range.end), |row| {
        Ok((row.get::<_, TransactionType>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut income = 0.0;
    let mut expenses = 0.0;

    for row in rows {
        match row? {
            (TransactionType::Income, total) => income = total,
            (TransactionType::Expense, total) => expenses = total,
        }
    }

    Ok((income, expenses))
}

/// Sum the user's expenses per category within `range`, ordered by category name.
pub(super) fn get_expense_breakdown(
    user_id: UserID,
    range: &Range<Date>,
    connection: &Connection,
) -> Result<Vec<ExpenseBreakdown>, Error> {
    connection
        .prepare(
            "SELECT c.name, SUM(t.amount) FROM \"transaction\" t
             INNER JOIN category c ON c.id = t.category_id
             WHERE t.user_id = ?1 AND t.type = 'Expense' AND t.date >= ?2 AND t.date < ?3
             GROUP BY c.id
             ORDER BY c.name ASC",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok(ExpenseBreakdown {
                category: row.get(0)?,
                amount: row.get(1)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn get_daily_net(
    user_id: UserID,
    range: &Range<Date>,
    connection: &Connection,
) -> Result<Vec<(Date, f64)>, Error> {
    connection
        .prepare(
            "SELECT date, SUM(CASE type WHEN 'Income' THEN amount ELSE -amount END)
             FROM \"transaction\"
             WHERE user_id = ?1 AND date >= ?2 AND date < ?3
             GROUP BY date
             ORDER BY date ASC",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

fn get_budget_vs_actual(
    user_id: UserID,
    today: Date,
    expense_breakdown: &[ExpenseBreakdown],
    connection: &Connection,
) -> Result<Vec<BudgetVsActual>, Error> {
    let budgets =
        get_budgets_for_month(user_id, u8::from(today.month()), today.year(), connection)?;

    Ok(budgets
        .into_iter()
        .map(|budget| {
            let category = budget.category_name.to_string();
            let spent = expense_breakdown
                .iter()
                .find(|breakdown| breakdown.category == category)
                .map_or(0.0, |breakdown| breakdown.amount);

            BudgetVsActual {
                category,
                limit: budget.monthly_limit,
                spent,
            }
        })
        .collect())
}

#[cfg(test)]
mod summary_tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        UserID,
        budget::{NewBudget, upsert_budget},
        category::{CategoryId, CategoryName, create_category},
        dashboard::{BudgetVsActual, ExpenseBreakdown, TrendPoint, get_dashboard_summary},
        db::test_utils::{get_test_connection, insert_test_user},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    struct Fixture {
        connection: Connection,
        user_id: UserID,
        food: CategoryId,
        rent: CategoryId,
        salary: CategoryId,
    }

    fn setup() -> Fixture {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let create = |name: &str| {
            create_category(user_id, CategoryName::new_unchecked(name), &connection)
                .unwrap()
                .id
        };
        let food = create("Food");
        let rent = create("Rent");
        let salary = create("Salary");

        Fixture {
            connection,
            user_id,
            food,
            rent,
            salary,
        }
    }

    fn insert(
        fixture: &Fixture,
        amount: f64,
        transaction_type: TransactionType,
        date: Date,
        category_id: CategoryId,
    ) {
        create_transaction(
            fixture.user_id,
            NewTransaction {
                title: "test".to_owned(),
                amount,
                transaction_type,
                date,
                category_id,
                description: None,
            },
            &fixture.connection,
        )
        .unwrap();
    }

    #[test]
    fn empty_month_is_all_zero() {
        let fixture = setup();

        let summary =
            get_dashboard_summary(fixture.user_id, date!(2025 - 03 - 14), &fixture.connection)
                .unwrap();

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert!(summary.expense_breakdown.is_empty());
        assert!(summary.trend_data.is_empty());
        assert!(summary.budget_vs_actual.is_empty());
    }

    #[test]
    fn totals_only_include_current_month() {
        let fixture = setup();
        insert(&fixture, 500.0, TransactionType::Income, date!(2025 - 02 - 28), fixture.salary);
        insert(&fixture, 1000.0, TransactionType::Income, date!(2025 - 03 - 01), fixture.salary);
        insert(&fixture, 300.0, TransactionType::Expense, date!(2025 - 03 - 31), fixture.rent);
        insert(&fixture, 99.0, TransactionType::Expense, date!(2025 - 04 - 01), fixture.rent);

        let summary =
            get_dashboard_summary(fixture.user_id, date!(2025 - 03 - 14), &fixture.connection)
                .unwrap();

        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expenses, 300.0);
        assert_eq!(summary.balance, 700.0);
    }

    #[test]
    fn breakdown_and_trend_are_grouped() {
        let fixture = setup();
        insert(&fixture, 1000.0, TransactionType::Income, date!(2025 - 03 - 01), fixture.salary);
        insert(&fixture, 300.0, TransactionType::Expense, date!(2025 - 03 - 01), fixture.rent);
        insert(&fixture, 20.0, TransactionType::Expense, date!(2025 - 03 - 03), fixture.food);
        insert(&fixture, 30.0, TransactionType::Expense, date!(2025 - 03 - 03), fixture.food);

        let summary =
            get_dashboard_summary(fixture.user_id, date!(2025 - 03 - 14), &fixture.connection)
                .unwrap();

        assert_eq!(
            summary.expense_breakdown,
            vec![
                ExpenseBreakdown {
                    category: "Food".to_owned(),
                    amount: 50.0
                },
                ExpenseBreakdown {
                    category: "Rent".to_owned(),
                    amount: 300.0
                },
            ]
        );
        assert_eq!(
            summary.trend_data,
            vec![
                TrendPoint {
                    date: date!(2025 - 03 - 01),
                    balance: 700.0
                },
                TrendPoint {
                    date: date!(2025 - 03 - 03),
                    balance: 650.0
                },
            ]
        );
    }

    #[test]
    fn budget_vs_actual_uses_current_month_budgets() {
        let fixture = setup();
        for (category_id, limit, month) in [
            (fixture.food, 100.0, 3),
            (fixture.rent, 300.0, 3),
            (fixture.food, 999.0, 2),
        ] {
            upsert_budget(
                fixture.user_id,
                NewBudget {
                    category_id,
                    monthly_limit: limit,
                    month,
                    year: 2025,
                },
                &fixture.connection,
            )
            .unwrap();
        }
        insert(&fixture, 120.0, TransactionType::Expense, date!(2025 - 03 - 02), fixture.food);

        let summary =
            get_dashboard_summary(fixture.user_id, date!(2025 - 03 - 14), &fixture.connection)
                .unwrap();

        assert_eq!(
            summary.budget_vs_actual,
            vec![
                BudgetVsActual {
                    category: "Food".to_owned(),
                    limit: 100.0,
                    spent: 120.0
                },
                BudgetVsActual {
                    category: "Rent".to_owned(),
                    limit: 300.0,
                    spent: 0.0
                },
            ]
        );
        assert!(summary.budget_vs_actual[0].is_over_budget());
        assert!(!summary.budget_vs_actual[1].is_over_budget());
    }

    #[test]
    fn other_users_transactions_are_excluded() {
        let fixture = setup();
        let bob = insert_test_user("bob", &fixture.connection);
        let bob_food = create_category(bob, CategoryName::new_unchecked("Food"), &fixture.connection)
            .unwrap()
            .id;
        create_transaction(
            bob,
            NewTransaction {
                title: "bob's".to_owned(),
                amount: 10.0,
                transaction_type: TransactionType::Expense,
                date: date!(2025 - 03 - 02),
                category_id: bob_food,
                description: None,
            },
            &fixture.connection,
        )
        .unwrap();

        let summary =
            get_dashboard_summary(fixture.user_id, date!(2025 - 03 - 14), &fixture.connection)
                .unwrap();

        assert_eq!(summary.total_expenses, 0.0);
        assert!(summary.expense_breakdown.is_empty());
    }
}
