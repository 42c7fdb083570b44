//! Database queries for budgets.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error, UserID,
    budget::{Budget, BudgetId, BudgetWrite, NewBudget},
    category::{CategoryName, get_category},
};

const SELECT_BUDGET: &str = "SELECT b.id, b.category_id, c.name, b.monthly_limit, b.month, b.year
    FROM budget b
    INNER JOIN category c ON c.id = b.category_id";

/// Store a budget, replacing the limit if the user already has a budget for
/// the same category, month and year.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not belong to the user.
pub fn upsert_budget(
    user_id: UserID,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<(Budget, BudgetWrite), Error> {
    get_category(user_id, new_budget.category_id, connection)?;

    let existing_id: Option<BudgetId> = connection
        .prepare(
            "SELECT id FROM budget
             WHERE user_id = ?1 AND category_id = ?2 AND month = ?3 AND year = ?4",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_budget.category_id,
                new_budget.month,
                new_budget.year,
            ),
            |row| row.get(0),
        )
        .optional()?;

    let (id, write) = match existing_id {
        Some(id) => {
            connection.execute(
                "UPDATE budget SET monthly_limit = ?1 WHERE id = ?2",
                (new_budget.monthly_limit, id),
            )?;
            (id, BudgetWrite::Updated)
        }
        None => {
            connection.execute(
                "INSERT INTO budget (user_id, category_id, monthly_limit, month, year)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    user_id.as_i64(),
                    new_budget.category_id,
                    new_budget.monthly_limit,
                    new_budget.month,
                    new_budget.year,
                ),
            )?;
            (connection.last_insert_rowid(), BudgetWrite::Created)
        }
    };

    Ok((get_budget(user_id, id, connection)?, write))
}

/// Retrieve one of the user's budgets.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if the ID does not belong to one of the user's budgets.
pub fn get_budget(user_id: UserID, budget_id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.id = :id AND b.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &budget_id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::BudgetNotFound,
            error => error.into(),
        })
}

/// Retrieve all of the user's budgets, newest month first, then by category name.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.user_id = :user_id
             ORDER BY b.year DESC, b.month DESC, c.name ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the user's budgets for one month ordered by category name.
pub fn get_budgets_for_month(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE b.user_id = ?1 AND b.month = ?2 AND b.year = ?3
             ORDER BY c.name ASC"
        ))?
        .query_map((user_id.as_i64(), month, year), map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's budgets.
///
/// # Errors
/// Returns [Error::BudgetNotFound] if the budget does not exist.
pub fn delete_budget(user_id: UserID, budget_id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetNotFound);
    }

    Ok(())
}

/// Create the budget table.
///
/// Budgets are deleted along with their category.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                monthly_limit REAL NOT NULL CHECK (monthly_limit >= 0),
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                UNIQUE(user_id, category_id, month, year),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                );",
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category: String = row.get(2)?;

    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        category_name: CategoryName::new_unchecked(&raw_category),
        monthly_limit: row.get(3)?,
        month: row.get(4)?,
        year: row.get(5)?,
    })
}

#[cfg(test)]
mod budget_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, UserID,
        budget::{
            BudgetWrite, NewBudget, delete_budget, get_budget, get_budgets,
            get_budgets_for_month, upsert_budget,
        },
        category::{CategoryId, CategoryName, create_category, delete_category},
        db::test_utils::{get_test_connection, insert_test_user},
    };

    fn setup() -> (Connection, UserID, CategoryId) {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let category =
            create_category(user_id, CategoryName::new_unchecked("Food"), &connection).unwrap();

        (connection, user_id, category.id)
    }

    fn new_budget(category_id: CategoryId, monthly_limit: f64, month: u8) -> NewBudget {
        NewBudget {
            category_id,
            monthly_limit,
            month,
            year: 2025,
        }
    }

    #[test]
    fn upsert_creates_then_updates() {
        let (connection, user_id, category_id) = setup();

        let (created, first_write) =
            upsert_budget(user_id, new_budget(category_id, 100.0, 3), &connection).unwrap();
        let (updated, second_write) =
            upsert_budget(user_id, new_budget(category_id, 150.0, 3), &connection).unwrap();

        assert_eq!(first_write, BudgetWrite::Created);
        assert_eq!(second_write, BudgetWrite::Updated);
        assert_eq!(created.id, updated.id);
        assert_eq!(updated.monthly_limit, 150.0);
        assert_eq!(get_budgets(user_id, &connection).unwrap(), vec![updated]);
    }

    #[test]
    fn different_month_is_a_new_budget() {
        let (connection, user_id, category_id) = setup();

        upsert_budget(user_id, new_budget(category_id, 100.0, 3), &connection).unwrap();
        let (_, write) =
            upsert_budget(user_id, new_budget(category_id, 100.0, 4), &connection).unwrap();

        assert_eq!(write, BudgetWrite::Created);
        assert_eq!(get_budgets(user_id, &connection).unwrap().len(), 2);
    }

    #[test]
    fn budget_for_other_users_category_is_rejected() {
        let (connection, _, category_id) = setup();
        let bob = insert_test_user("bob", &connection);

        let result = upsert_budget(bob, new_budget(category_id, 100.0, 3), &connection);

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn get_budgets_for_month_filters_month() {
        let (connection, user_id, category_id) = setup();
        let (march, _) =
            upsert_budget(user_id, new_budget(category_id, 100.0, 3), &connection).unwrap();
        upsert_budget(user_id, new_budget(category_id, 100.0, 4), &connection).unwrap();

        let budgets = get_budgets_for_month(user_id, 3, 2025, &connection).unwrap();

        assert_eq!(budgets, vec![march]);
    }

    #[test]
    fn deleting_category_deletes_its_budgets() {
        let (connection, user_id, category_id) = setup();
        let (budget, _) =
            upsert_budget(user_id, new_budget(category_id, 100.0, 3), &connection).unwrap();

        delete_category(user_id, category_id, &connection).unwrap();

        assert_eq!(
            get_budget(user_id, budget.id, &connection),
            Err(Error::BudgetNotFound)
        );
    }

    #[test]
    fn delete_budget_is_scoped_to_user() {
        let (connection, user_id, category_id) = setup();
        let bob = insert_test_user("bob", &connection);
        let (budget, _) =
            upsert_budget(user_id, new_budget(category_id, 100.0, 3), &connection).unwrap();

        assert_eq!(
            delete_budget(bob, budget.id, &connection),
            Err(Error::BudgetNotFound)
        );
        assert_eq!(delete_budget(user_id, budget.id, &connection), Ok(()));
        assert!(get_budgets(user_id, &connection).unwrap().is_empty());
    }
}
