//! Database queries for transactions.
//!
//! Transactions store a category ID. The category name is joined in on every
//! read so that renaming a category is reflected everywhere.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::{CategoryName, get_category},
    transaction::{NewTransaction, Transaction, TransactionId, TransactionUpdate},
};

/// The columns selected by every transaction query, in the order [map_transaction_row] expects.
pub(super) const SELECT_TRANSACTION: &str = "SELECT t.id, t.title, t.amount, t.type, t.date, \
    t.category_id, c.name, t.description
    FROM \"transaction\" t
    INNER JOIN category c ON c.id = t.category_id";

/// Create a transaction for `user_id`.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not belong to the user.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_category(user_id, new_transaction.category_id, connection)?;

    let id: TransactionId = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, title, amount, type, date, category_id, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &new_transaction.title,
                new_transaction.amount,
                new_transaction.transaction_type,
                new_transaction.date,
                new_transaction.category_id,
                &new_transaction.description,
            ),
            |row| row.get(0),
        )
        .map_err(map_foreign_key_violation)?;

    get_transaction(user_id, id, connection)
}

/// Retrieve one of the user's transactions.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the ID does not belong to one of the user's transactions.
pub fn get_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &transaction_id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
            error => error.into(),
        })
}

/// Retrieve all of the user's transactions ordered by date, then ID.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.user_id = :user_id ORDER BY t.date ASC, t.id ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to one of the user's transactions and return the result.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist, or
/// [Error::CategoryNotFound] if the new category does not belong to the user.
pub fn update_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let current = get_transaction(user_id, transaction_id, connection)?;

    if let Some(category_id) = update.category_id {
        get_category(user_id, category_id, connection)?;
    }

    let description = match update.description {
        Some(description) => description,
        None => current.description,
    };

    connection
        .execute(
            "UPDATE \"transaction\"
             SET title = ?1, amount = ?2, type = ?3, date = ?4, category_id = ?5, description = ?6
             WHERE id = ?7 AND user_id = ?8",
            (
                update.title.unwrap_or(current.title),
                update.amount.unwrap_or(current.amount),
                update.transaction_type.unwrap_or(current.transaction_type),
                update.date.unwrap_or(current.date),
                update.category_id.unwrap_or(current.category_id),
                description,
                transaction_id,
                user_id.as_i64(),
            ),
        )
        .map_err(map_foreign_key_violation)?;

    get_transaction(user_id, transaction_id, connection)
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Create the transaction table.
///
/// Categories cannot be deleted while transactions refer to them.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                type TEXT NOT NULL CHECK (type IN ('Income', 'Expense')),
                date TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                description TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

fn map_foreign_key_violation(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::CategoryNotFound,
        error => error.into(),
    }
}

/// Map a row selected with [SELECT_TRANSACTION] to a [Transaction].
pub(super) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(6)?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        date: row.get(4)?,
        category_id: row.get(5)?,
        category: CategoryName::new_unchecked(&raw_category),
        description: row.get(7)?,
    })
}

#[cfg(test)]
mod transaction_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, UserID,
        category::{CategoryId, CategoryName, create_category, delete_category, rename_category},
        db::test_utils::{get_test_connection, insert_test_user},
        transaction::{
            NewTransaction, TransactionType, TransactionUpdate, create_transaction,
            delete_transaction, get_transaction, get_transactions, update_transaction,
        },
    };

    fn setup() -> (Connection, UserID, CategoryId) {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let category =
            create_category(user_id, CategoryName::new_unchecked("Food"), &connection).unwrap();

        (connection, user_id, category.id)
    }

    fn new_transaction(category_id: CategoryId, date: time::Date) -> NewTransaction {
        NewTransaction {
            title: "Weekly shop".to_owned(),
            amount: 42.5,
            transaction_type: TransactionType::Expense,
            date,
            category_id,
            description: None,
        }
    }

    #[test]
    fn create_transaction_joins_category_name() {
        let (connection, user_id, category_id) = setup();

        let transaction = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.category.as_ref(), "Food");
        assert_eq!(transaction.category_id, category_id);
        assert_eq!(transaction.date, date!(2025 - 03 - 14));
    }

    #[test]
    fn create_transaction_with_other_users_category_fails() {
        let (connection, _, category_id) = setup();
        let bob = insert_test_user("bob", &connection);

        let result = create_transaction(
            bob,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        );

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn get_transactions_is_ordered_by_date_and_scoped() {
        let (connection, user_id, category_id) = setup();
        let bob = insert_test_user("bob", &connection);
        let bob_category =
            create_category(bob, CategoryName::new_unchecked("Food"), &connection).unwrap();
        let later = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 20)),
            &connection,
        )
        .unwrap();
        let earlier = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 01)),
            &connection,
        )
        .unwrap();
        create_transaction(
            bob,
            new_transaction(bob_category.id, date!(2025 - 03 - 05)),
            &connection,
        )
        .unwrap();

        let transactions = get_transactions(user_id, &connection).unwrap();

        assert_eq!(transactions, vec![earlier, later]);
    }

    #[test]
    fn get_other_users_transaction_is_not_found() {
        let (connection, user_id, category_id) = setup();
        let bob = insert_test_user("bob", &connection);
        let transaction = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(bob, transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
        assert_eq!(
            delete_transaction(bob, transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
    }

    #[test]
    fn update_transaction_changes_only_given_fields() {
        let (connection, user_id, category_id) = setup();
        let transaction = create_transaction(
            user_id,
            NewTransaction {
                description: Some("milk".to_owned()),
                ..new_transaction(category_id, date!(2025 - 03 - 14))
            },
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            user_id,
            transaction.id,
            TransactionUpdate {
                amount: Some(10.0),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, 10.0);
        assert_eq!(updated.title, transaction.title);
        assert_eq!(updated.description.as_deref(), Some("milk"));
    }

    #[test]
    fn update_transaction_can_clear_description() {
        let (connection, user_id, category_id) = setup();
        let transaction = create_transaction(
            user_id,
            NewTransaction {
                description: Some("milk".to_owned()),
                ..new_transaction(category_id, date!(2025 - 03 - 14))
            },
            &connection,
        )
        .unwrap();

        let updated = update_transaction(
            user_id,
            transaction.id,
            TransactionUpdate {
                description: Some(None),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.description, None);
    }

    #[test]
    fn renamed_category_shows_on_transactions() {
        let (connection, user_id, category_id) = setup();
        let transaction = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();

        rename_category(
            user_id,
            category_id,
            CategoryName::new_unchecked("Groceries"),
            &connection,
        )
        .unwrap();

        let transaction = get_transaction(user_id, transaction.id, &connection).unwrap();
        assert_eq!(transaction.category.as_ref(), "Groceries");
    }

    #[test]
    fn category_with_transactions_cannot_be_deleted() {
        let (connection, user_id, category_id) = setup();
        create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();

        let result = delete_category(user_id, category_id, &connection);

        assert_eq!(result, Err(Error::CategoryInUse));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (connection, user_id, category_id) = setup();
        let transaction = create_transaction(
            user_id,
            new_transaction(category_id, date!(2025 - 03 - 14)),
            &connection,
        )
        .unwrap();

        delete_transaction(user_id, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(user_id, transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
    }
}
