//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from the IDs of the records a user owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateUsername] if the username is taken,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(
    username: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    if row_exists(
        "SELECT EXISTS(SELECT 1 FROM user WHERE username = ?1)",
        username,
        connection,
    )? {
        return Err(Error::DuplicateUsername);
    }

    if row_exists("SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1)", email, connection)? {
        return Err(Error::DuplicateEmail);
    }

    connection
        .execute(
            "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
            (username, email, password_hash.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash,
    })
}

fn row_exists(query: &str, value: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(query, [value], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get the user whose username is `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the database.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, email, password FROM user WHERE username = :username")?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        user::{UserID, create_user, get_user_by_id, get_user_by_username},
    };

    use super::create_user_table;

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user("alice", "alice@example.com", password_hash.clone(), &conn)
            .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let conn = get_db_connection();
        create_user("alice", "alice@example.com", PasswordHash::new_unchecked("a"), &conn)
            .unwrap();

        let result = create_user("alice", "other@example.com", PasswordHash::new_unchecked("b"), &conn);

        assert_eq!(result, Err(Error::DuplicateUsername));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = get_db_connection();
        create_user("alice", "alice@example.com", PasswordHash::new_unchecked("a"), &conn)
            .unwrap();

        let result = create_user("bob", "alice@example.com", PasswordHash::new_unchecked("b"), &conn);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn duplicate_username_and_email_reports_username() {
        let conn = get_db_connection();
        create_user("alice", "alice@example.com", PasswordHash::new_unchecked("a"), &conn)
            .unwrap();

        let result = create_user("alice", "alice@example.com", PasswordHash::new_unchecked("b"), &conn);

        assert_eq!(result, Err(Error::DuplicateUsername));
    }

    #[test]
    fn get_user_by_username_returns_inserted_user() {
        let conn = get_db_connection();
        let inserted =
            create_user("alice", "alice@example.com", PasswordHash::new_unchecked("a"), &conn)
                .unwrap();

        let selected = get_user_by_username("alice", &conn);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_user_with_unknown_id_returns_not_found() {
        let conn = get_db_connection();

        let result = get_user_by_id(UserID::new(42), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }
}
