use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use moneylens::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a test database for the MoneyLens REST API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'test' with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    conn.execute(
        "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
        ("test", "test@example.com", password_hash.to_string()),
    )?;
    let user_id = conn.last_insert_rowid();

    println!("Creating categories...");

    let food = insert_category(&conn, user_id, "Food")?;
    let rent = insert_category(&conn, user_id, "Rent")?;
    let salary = insert_category(&conn, user_id, "Salary")?;
    let transport = insert_category(&conn, user_id, "Transport")?;

    println!("Creating transactions for this month and last month...");

    let today = OffsetDateTime::now_utc().date();
    let this_month = today.replace_day(1)?;
    let last_month = (this_month - Duration::days(1)).replace_day(1)?;

    for month_start in [last_month, this_month] {
        let transactions: [(&str, f64, &str, i64, i64); 6] = [
            ("Pay", 4200.0, "Income", 0, salary),
            ("Rent", 1800.0, "Expense", 1, rent),
            ("Weekly shop", 185.4, "Expense", 3, food),
            ("Bus pass", 60.0, "Expense", 4, transport),
            ("Takeaways", 42.5, "Expense", 9, food),
            ("Weekly shop", 171.25, "Expense", 10, food),
        ];

        for (title, amount, transaction_type, day_offset, category_id) in transactions {
            let date = month_start + Duration::days(day_offset);
            if date > today {
                continue;
            }

            insert_transaction(&conn, user_id, title, amount, transaction_type, date, category_id)?;
        }
    }

    println!("Creating budgets for this month...");

    for (category_id, limit) in [(food, 300.0), (rent, 1800.0), (transport, 50.0)] {
        conn.execute(
            "INSERT INTO budget (user_id, category_id, monthly_limit, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                user_id,
                category_id,
                limit,
                u8::from(this_month.month()),
                this_month.year(),
            ),
        )?;
    }

    println!("Success!");

    Ok(())
}

fn insert_category(conn: &Connection, user_id: i64, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO category (user_id, name) VALUES (?1, ?2)",
        (user_id, name),
    )?;

    Ok(conn.last_insert_rowid())
}

fn insert_transaction(
    conn: &Connection,
    user_id: i64,
    title: &str,
    amount: f64,
    transaction_type: &str,
    date: Date,
    category_id: i64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO \"transaction\" (user_id, title, amount, type, date, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (user_id, title, amount, transaction_type, date, category_id),
    )?;

    Ok(())
}
