//! Database operations for categories.
//!
//! Every query is scoped to the owning user, so one user's category IDs are
//! invisible to everyone else.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::{Category, CategoryId, CategoryName},
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if the user already has a category called `name`.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name) VALUES (?1, ?2);",
            (user_id.as_i64(), name.as_ref()),
        )
        .map_err(map_unique_violation)?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the ID does not belong to one of the user's categories.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id AND user_id = :user_id;")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(map_not_found)
}

/// Retrieve one of the user's categories by its exact name.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the user has no category called `name`.
pub fn get_category_by_name(
    user_id: UserID,
    name: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE name = :name AND user_id = :user_id;")?
        .query_row(
            rusqlite::named_params! {":name": name, ":user_id": user_id.as_i64()},
            map_row,
        )
        .map_err(map_not_found)
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_all_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE user_id = :user_id ORDER BY name ASC, id ASC;")?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename one of the user's categories.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not exist, or
/// [Error::DuplicateCategoryName] if the new name is already used by another category.
pub fn rename_category(
    user_id: UserID,
    category_id: CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            (new_name.as_ref(), category_id, user_id.as_i64()),
        )
        .map_err(map_unique_violation)?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(Category {
        id: category_id,
        name: new_name,
    })
}

/// Delete one of the user's categories along with its budgets.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not exist, or
/// [Error::CategoryInUse] if transactions still refer to it.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let in_use: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE category_id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if in_use {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                    || sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER =>
            {
                Error::CategoryInUse
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_unique_violation(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName,
        error => error.into(),
    }
}

fn map_not_found(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound,
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category { id, name })
}

#[cfg(test)]
mod category_query_tests {
    use crate::{
        Error,
        category::{
            CategoryName, create_category, delete_category, get_all_categories, get_category,
            get_category_by_name, rename_category,
        },
        db::test_utils::{get_test_connection, insert_test_user},
    };

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(user_id, name.clone(), &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
    }

    #[test]
    fn duplicate_name_for_same_user_is_rejected() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        create_category(user_id, CategoryName::new_unchecked("Food"), &connection).unwrap();

        let result = create_category(user_id, CategoryName::new_unchecked("Food"), &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName));
    }

    #[test]
    fn same_name_for_different_users_is_allowed() {
        let connection = get_test_connection();
        let alice = insert_test_user("alice", &connection);
        let bob = insert_test_user("bob", &connection);
        create_category(alice, CategoryName::new_unchecked("Food"), &connection).unwrap();

        let result = create_category(bob, CategoryName::new_unchecked("Food"), &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_category_of_other_user_returns_not_found() {
        let connection = get_test_connection();
        let alice = insert_test_user("alice", &connection);
        let bob = insert_test_user("bob", &connection);
        let category =
            create_category(alice, CategoryName::new_unchecked("Food"), &connection).unwrap();

        let result = get_category(bob, category.id, &connection);

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn get_category_by_name_finds_exact_match() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let inserted =
            create_category(user_id, CategoryName::new_unchecked("Food"), &connection).unwrap();

        assert_eq!(get_category_by_name(user_id, "Food", &connection), Ok(inserted));
        assert_eq!(
            get_category_by_name(user_id, "Rent", &connection),
            Err(Error::CategoryNotFound)
        );
    }

    #[test]
    fn get_all_categories_is_sorted_and_scoped() {
        let connection = get_test_connection();
        let alice = insert_test_user("alice", &connection);
        let bob = insert_test_user("bob", &connection);
        let rent = create_category(alice, CategoryName::new_unchecked("Rent"), &connection).unwrap();
        let food = create_category(alice, CategoryName::new_unchecked("Food"), &connection).unwrap();
        create_category(bob, CategoryName::new_unchecked("Travel"), &connection).unwrap();

        let categories = get_all_categories(alice, &connection).unwrap();

        assert_eq!(categories, vec![food, rent]);
    }

    #[test]
    fn rename_category_succeeds() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let category =
            create_category(user_id, CategoryName::new_unchecked("Fod"), &connection).unwrap();

        rename_category(user_id, category.id, CategoryName::new_unchecked("Food"), &connection)
            .expect("Could not rename category");

        let renamed = get_category(user_id, category.id, &connection).unwrap();
        assert_eq!(renamed.name.as_ref(), "Food");
    }

    #[test]
    fn rename_missing_category_returns_not_found() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);

        let result = rename_category(user_id, 999, CategoryName::new_unchecked("Food"), &connection);

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let user_id = insert_test_user("alice", &connection);
        let category =
            create_category(user_id, CategoryName::new_unchecked("Food"), &connection).unwrap();

        delete_category(user_id, category.id, &connection).expect("Could not delete category");

        assert_eq!(
            get_category(user_id, category.id, &connection),
            Err(Error::CategoryNotFound)
        );
    }

    #[test]
    fn delete_category_of_other_user_returns_not_found() {
        let connection = get_test_connection();
        let alice = insert_test_user("alice", &connection);
        let bob = insert_test_user("bob", &connection);
        let category =
            create_category(alice, CategoryName::new_unchecked("Food"), &connection).unwrap();

        let result = delete_category(bob, category.id, &connection);

        assert_eq!(result, Err(Error::CategoryNotFound));
        assert!(get_category(alice, category.id, &connection).is_ok());
    }
}
