use std::{fs, io, path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moneylens::{
    LogInForm, RegisterForm, TransactionFilterQuery,
    client::{
        Alert, ApiClient, AuthForm, BudgetInput, BudgetPlanner, CategoryList, DashboardState,
        DashboardView, FetchOutcome, FileTokenStore, MutationOutcome, TransactionBrowser,
        TransactionInput,
    },
};

/// A command line client for the MoneyLens REST API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// The URL of the MoneyLens server.
    #[arg(long, env = "MONEYLENS_URL", default_value = "http://127.0.0.1:3000", global = true)]
    base_url: String,

    /// Where the bearer token is kept between runs.
    #[arg(long, env = "MONEYLENS_TOKEN_FILE", default_value = ".moneylens_token", global = true)]
    token_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account. The password is read from the terminal.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Log in and save the bearer token. The password is read from the terminal.
    Login {
        #[arg(long)]
        username: String,
    },
    /// Forget the saved bearer token.
    Logout,
    /// Manage categories.
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Manage monthly budgets.
    #[command(subcommand)]
    Budgets(BudgetCommand),
    /// Manage transactions.
    #[command(subcommand)]
    Transactions(TransactionCommand),
    /// Show the summary of the current month.
    Dashboard {
        /// Write the dashboard as HTML to this file instead of printing a summary.
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Show spending advice for the current month.
    Suggestions,
    /// Download all transactions as CSV.
    Export {
        /// The file to write. Prints to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// List categories.
    List,
    /// Add a category.
    Add { name: String },
    /// Rename a category.
    Rename { id: i64, name: String },
    /// Delete a category and its budgets.
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// List budgets.
    List,
    /// Set the limit for a category and month.
    Set {
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        limit: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: String,
    },
    /// Delete a budget.
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    /// List transactions, optionally filtered.
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<String>,
        /// The category name.
        #[arg(long)]
        category: Option<String>,
        /// Text to look for in the title or description.
        #[arg(long)]
        search: Option<String>,
    },
    /// Record a transaction.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        /// "Income" or "Expense".
        #[arg(long = "type", default_value = "Expense")]
        transaction_type: String,
        /// The date as YYYY-MM-DD.
        #[arg(long)]
        date: String,
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit the given fields of a transaction.
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category_id: Option<i64>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a transaction.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match ApiClient::new(&cli.base_url, FileTokenStore::new(&cli.token_file)) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            print_error(error);
            return ExitCode::FAILURE;
        }
    };

    if !matches!(
        cli.command,
        Command::Register { .. } | Command::Login { .. } | Command::Logout
    ) && !client.is_logged_in()
    {
        print_error("You must be logged in. Run `moneylens login` first.");
        return ExitCode::FAILURE;
    }

    let succeeded = match cli.command {
        Command::Register { username, email } => register(client, username, email).await,
        Command::Login { username } => log_in(client, username).await,
        Command::Logout => match client.log_out() {
            Ok(()) => {
                println!("Logged out.");
                true
            }
            Err(error) => {
                print_error(error);
                false
            }
        },
        Command::Categories(command) => categories(client, command).await,
        Command::Budgets(command) => budgets(client, command).await,
        Command::Transactions(command) => transactions(client, command).await,
        Command::Dashboard { html } => dashboard(client, html).await,
        Command::Suggestions => match client.get_suggestions().await {
            Ok(suggestions) => {
                let suggestions = suggestions.map(|s| s.suggestions).unwrap_or_default();
                if suggestions.is_empty() {
                    println!("No suggestions this month.");
                }
                for suggestion in suggestions {
                    println!("- {suggestion}");
                }
                true
            }
            Err(error) => {
                print_error(format!("Error fetching suggestions: {error}"));
                false
            }
        },
        Command::Export { output } => export(client, output).await,
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn register(client: Arc<ApiClient>, username: String, email: String) -> bool {
    let Some(password) = prompt_password("Password: ") else {
        return false;
    };

    let mut form = AuthForm::new(client);
    if let Some(alert) = form.prime().await {
        return show_alert(&alert);
    }

    let alert = form
        .register(&RegisterForm {
            username: Some(username),
            email: Some(email),
            password: Some(password),
        })
        .await;

    show_alert(&alert)
}

async fn log_in(client: Arc<ApiClient>, username: String) -> bool {
    let Some(password) = prompt_password("Password: ") else {
        return false;
    };

    let mut form = AuthForm::new(client);
    if let Some(alert) = form.prime().await {
        return show_alert(&alert);
    }

    let alert = form
        .log_in(&LogInForm {
            username: Some(username),
            password: Some(password),
        })
        .await;

    show_alert(&alert)
}

async fn categories(client: Arc<ApiClient>, command: CategoryCommand) -> bool {
    let mut list = CategoryList::new(client);

    let outcome = match command {
        CategoryCommand::List => {
            if !show_fetch(list.refresh().await) {
                return false;
            }
            for category in list.categories() {
                println!("{:>5}  {}", category.id, category.name);
            }
            return true;
        }
        CategoryCommand::Add { name } => list.add(&name).await,
        CategoryCommand::Rename { id, name } => list.rename(id, &name).await,
        CategoryCommand::Delete { id } => list.delete(id).await,
    };

    show_outcome(&outcome)
}

async fn budgets(client: Arc<ApiClient>, command: BudgetCommand) -> bool {
    let mut planner = BudgetPlanner::new(client);

    let outcome = match command {
        BudgetCommand::List => {
            if !show_fetch(planner.refresh_budgets().await) {
                return false;
            }
            for budget in planner.budgets() {
                println!(
                    "{:>5}  {:04}-{:02}  {:<20} ${:.2}",
                    budget.id, budget.year, budget.month, budget.category_name, budget.monthly_limit
                );
            }
            return true;
        }
        BudgetCommand::Set {
            category_id,
            limit,
            month,
            year,
        } => {
            planner
                .set_budget(&BudgetInput {
                    category_id: Some(category_id),
                    monthly_limit: limit,
                    month,
                    year,
                })
                .await
        }
        BudgetCommand::Delete { id } => planner.delete_budget(id).await,
    };

    show_outcome(&outcome)
}

async fn transactions(client: Arc<ApiClient>, command: TransactionCommand) -> bool {
    let mut browser = TransactionBrowser::new(client);

    let outcome = match command {
        TransactionCommand::List {
            month,
            year,
            category,
            search,
        } => {
            let filters = TransactionFilterQuery {
                month,
                year,
                category,
                search,
            };
            if !show_fetch(browser.set_filters(filters).await) {
                return false;
            }
            for transaction in browser.transactions() {
                println!(
                    "{:>5}  {}  {:<7}  {:>10.2}  {:<15}  {}",
                    transaction.id,
                    transaction.date,
                    transaction.transaction_type,
                    transaction.amount,
                    transaction.category,
                    transaction.title
                );
            }
            return true;
        }
        TransactionCommand::Add {
            title,
            amount,
            transaction_type,
            date,
            category_id,
            description,
        } => {
            browser
                .add(&TransactionInput {
                    title,
                    amount,
                    transaction_type,
                    date,
                    category_id: Some(category_id),
                    description: description.unwrap_or_default(),
                })
                .await
        }
        TransactionCommand::Edit {
            id,
            title,
            amount,
            transaction_type,
            date,
            category_id,
            description,
        } => {
            if let Some(alert) = browser.start_edit(id).await {
                return show_alert(&alert);
            }
            if let Some(editor) = browser.editor_mut() {
                let input = &mut editor.input;
                input.title = title.unwrap_or(input.title.clone());
                input.amount = amount.unwrap_or(input.amount.clone());
                input.transaction_type =
                    transaction_type.unwrap_or(input.transaction_type.clone());
                input.date = date.unwrap_or(input.date.clone());
                input.category_id = category_id.or(input.category_id);
                input.description = description.unwrap_or(input.description.clone());
            }
            browser.save_edit().await
        }
        TransactionCommand::Delete { id } => browser.delete(id).await,
    };

    show_outcome(&outcome)
}

async fn dashboard(client: Arc<ApiClient>, html: Option<PathBuf>) -> bool {
    let mut view = DashboardView::new(client);
    view.load().await;

    if let Some(path) = html {
        return match fs::write(&path, view.render().into_string()) {
            Ok(()) => {
                println!("Dashboard written to {path:?}");
                true
            }
            Err(error) => {
                print_error(format!("Could not write {path:?}: {error}"));
                false
            }
        };
    }

    match view.state() {
        DashboardState::Loading => false,
        DashboardState::Failed(message) => {
            print_error(format!("Error loading dashboard: {message}"));
            false
        }
        DashboardState::Ready(summary) => {
            println!("Total Income:   ${:.2}", summary.total_income);
            println!("Total Expenses: ${:.2}", summary.total_expenses);
            println!("Balance:        ${:.2}", summary.balance);
            println!();
            println!("Budget vs Actual Spending (Current Month)");
            if summary.budget_vs_actual.is_empty() {
                println!("  No budgets set for the current month.");
            }
            for row in &summary.budget_vs_actual {
                let marker = if row.is_over_budget() { " (Over Budget)" } else { "" };
                println!(
                    "  {}: Budgeted ${:.2}, Spent ${:.2}{marker}",
                    row.category, row.limit, row.spent
                );
            }
            true
        }
    }
}

async fn export(client: Arc<ApiClient>, output: Option<PathBuf>) -> bool {
    let csv = match client.export_csv().await {
        Ok(Some(csv)) => csv,
        Ok(None) => return false,
        Err(error) => {
            print_error(format!("Error exporting transactions: {error}"));
            return false;
        }
    };

    match output {
        Some(path) => match fs::write(&path, csv) {
            Ok(()) => {
                println!("Transactions written to {path:?}");
                true
            }
            Err(error) => {
                print_error(format!("Could not write {path:?}: {error}"));
                false
            }
        },
        None => {
            print!("{csv}");
            true
        }
    }
}

fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn show_alert(alert: &Alert) -> bool {
    match alert {
        Alert::Success(text) => {
            println!("{text}");
            true
        }
        Alert::Error(text) => {
            print_error(text);
            false
        }
    }
}

fn show_outcome(outcome: &MutationOutcome) -> bool {
    match outcome.alert() {
        Some(alert) => show_alert(alert),
        None => false,
    }
}

fn show_fetch(outcome: FetchOutcome) -> bool {
    match outcome {
        FetchOutcome::Applied => true,
        FetchOutcome::Failed(error) => {
            print_error(error);
            false
        }
        FetchOutcome::Stale | FetchOutcome::Skipped => false,
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
