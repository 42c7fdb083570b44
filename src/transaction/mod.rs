//! Income and expense transactions.

mod db;
mod domain;
mod endpoints;
mod export;
mod filter;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, update_transaction,
};
pub use domain::{
    NewTransaction, Transaction, TransactionForm, TransactionId, TransactionType,
    TransactionUpdate, parse_date,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use export::{export_transactions_endpoint, write_transactions_csv};
pub use filter::{
    TransactionFilter, TransactionFilterQuery, filter_transactions, filter_transactions_endpoint,
};
