//! CSV export of a user's transactions.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Claims, Error,
    db::lock_connection,
    transaction::{Transaction, endpoints::TransactionState, get_transactions},
};

/// The header row of the exported CSV file.
const CSV_HEADER: [&str; 6] = ["Title", "Amount", "Type", "Date", "Category", "Description"];

/// Write `transactions` as CSV, starting with a header row.
///
/// # Errors
/// Returns [Error::CsvError] if a record cannot be written.
pub fn write_transactions_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for transaction in transactions {
        let amount = transaction.amount.to_string();
        let date = transaction.date.to_string();

        writer
            .write_record([
                transaction.title.as_str(),
                amount.as_str(),
                transaction.transaction_type.as_str(),
                date.as_str(),
                transaction.category.as_ref(),
                transaction.description.as_deref().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    Error::CsvError(error.to_string())
}

/// Download all of the user's transactions as `transactions.csv`.
pub async fn export_transactions_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
) -> Result<Response, Error> {
    let transactions = {
        let connection = lock_connection(&state.db_connection)?;
        get_transactions(claims.user_id(), &connection)?
    };

    let body = write_transactions_csv(&transactions)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (CONTENT_DISPOSITION, "attachment; filename=transactions.csv"),
        ],
        body,
    )
        .into_response())
}
