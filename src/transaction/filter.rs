//! Filtered transaction queries.
//!
//! Each filter is optional and empty values are ignored, so
//! `/transactions/filter?category=Food&month=` only filters by category.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::{
    Claims, Error, UserID,
    category::get_category_by_name,
    db::lock_connection,
    transaction::{
        Transaction,
        db::{SELECT_TRANSACTION, map_transaction_row},
        endpoints::TransactionState,
    },
};

/// The raw query string of a filter request.
///
/// Values are kept as strings so that bad numbers can be reported with a
/// JSON error instead of a query rejection.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilterQuery {
    /// The month as a number from 1 to 12.
    pub month: Option<String>,
    /// The four digit year.
    pub year: Option<String>,
    /// The exact name of one of the user's categories.
    pub category: Option<String>,
    /// Text to look for in the title or description.
    pub search: Option<String>,
}

/// A validated set of filters. `None` means the filter is not applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions in this month of any year.
    pub month: Option<u8>,
    /// Only include transactions in this year.
    pub year: Option<i32>,
    /// Only include transactions in the category with this name.
    pub category: Option<String>,
    /// Only include transactions whose title or description contains this text, ignoring case.
    pub search: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl TryFrom<TransactionFilterQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionFilterQuery) -> Result<Self, Self::Error> {
        let month = non_empty(query.month.as_deref())
            .map(|raw_month| {
                raw_month
                    .parse::<u8>()
                    .ok()
                    .filter(|month| (1..=12).contains(month))
                    .ok_or(Error::InvalidMonthOrYear)
            })
            .transpose()?;

        let year = non_empty(query.year.as_deref())
            .map(|raw_year| {
                raw_year
                    .parse::<i32>()
                    .map_err(|_| Error::InvalidMonthOrYear)
            })
            .transpose()?;

        Ok(Self {
            month,
            year,
            category: non_empty(query.category.as_deref()).map(str::to_owned),
            search: non_empty(query.search.as_deref()).map(str::to_owned),
        })
    }
}

/// Escape the LIKE wildcards in `text` and wrap it for a substring match.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

/// Get the user's transactions that match every filter in `filter`, ordered by date then ID.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category filter names a category the user does not have.
pub fn filter_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut clauses = vec!["t.user_id = :user_id"];
    let mut params: Vec<(&str, Box<dyn ToSql>)> = vec![(":user_id", Box::new(user_id.as_i64()))];

    if let Some(month) = filter.month {
        clauses.push("CAST(strftime('%m', t.date) AS INTEGER) = :month");
        params.push((":month", Box::new(month)));
    }

    if let Some(year) = filter.year {
        clauses.push("CAST(strftime('%Y', t.date) AS INTEGER) = :year");
        params.push((":year", Box::new(year)));
    }

    if let Some(category_name) = &filter.category {
        let category = get_category_by_name(user_id, category_name, connection)?;
        clauses.push("t.category_id = :category_id");
        params.push((":category_id", Box::new(category.id)));
    }

    if let Some(search) = &filter.search {
        clauses.push(
            "(t.title LIKE :search ESCAPE '\\' OR COALESCE(t.description, '') LIKE :search ESCAPE '\\')",
        );
        params.push((":search", Box::new(like_pattern(search))));
    }

    let query = format!(
        "{SELECT_TRANSACTION} WHERE {} ORDER BY t.date ASC, t.id ASC",
        clauses.join(" AND ")
    );
    let params: Vec<(&str, &dyn ToSql)> = params
        .iter()
        .map(|(name, value)| (*name, value.as_ref()))
        .collect();

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// A route handler for querying transactions by month, year, category and search text.
pub async fn filter_transactions_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Query(query): Query<TransactionFilterQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;
    let connection = lock_connection(&state.db_connection)?;

    filter_transactions(claims.user_id(), &filter, &connection).map(Json)
}
