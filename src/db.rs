//! Database setup shared by the domain modules.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error, budget::create_budget_table, category::create_category_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the domain models if they do not exist.
///
/// Foreign key enforcement is switched on first since SQLite leaves it off by default.
///
/// # Errors
/// Returns an error if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Lock the shared connection, mapping a poisoned lock to [Error::DatabaseLockError].
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

#[cfg(test)]
pub(crate) mod test_utils {
    use rusqlite::Connection;

    use crate::{PasswordHash, UserID, user::create_user};

    use super::initialize;

    /// An initialized in-memory database.
    pub(crate) fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    /// Insert a user named `username` and return their ID.
    pub(crate) fn insert_test_user(username: &str, connection: &Connection) -> UserID {
        create_user(
            username,
            &format!("{username}@example.com"),
            PasswordHash::new_unchecked("not-a-real-hash"),
            connection,
        )
        .expect("Could not create test user")
        .id
    }
}
