//! Core transaction models and validation of request bodies.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    DatabaseId, Error,
    category::{CategoryId, CategoryName},
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Whether money was earned or spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionType::Income),
            "Expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidTransactionType),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short name for the transaction, e.g. "Weekly shop".
    pub title: String,
    /// The amount of money spent or earned. Always positive, see `transaction_type`.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The name of the category, joined in from the category table.
    pub category: CategoryName,
    /// Optional free-form notes.
    pub description: Option<String>,
}

/// A validated transaction ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short, non-empty name for the transaction.
    pub title: String,
    /// A finite, positive amount.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// Optional notes. Blank descriptions are stored as `None`.
    pub description: Option<String>,
}

/// The JSON body for creating or editing a transaction.
///
/// Every field is optional so that creation can report all missing fields
/// with one error and edits can change any subset of fields.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    /// A short name for the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The amount as a JSON number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// "Income" or "Expense".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    /// The date formatted as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// The ID of one of the user's categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Optional notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The validated fields of an edit. `None` leaves the stored value unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new title.
    pub title: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new type.
    pub transaction_type: Option<TransactionType>,
    /// The new date.
    pub date: Option<Date>,
    /// The new category.
    pub category_id: Option<CategoryId>,
    /// The new description. `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [Error::InvalidDate] for any other format or an impossible date.
pub fn parse_date(raw_date: &str) -> Result<Date, Error> {
    Date::parse(raw_date.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate)
}

fn validate_title(raw_title: &str) -> Option<String> {
    let title = raw_title.trim();
    (!title.is_empty()).then(|| title.to_owned())
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount)
    }
}

fn normalize_description(raw_description: Option<&str>) -> Option<String> {
    raw_description
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .map(str::to_owned)
}

impl TransactionForm {
    /// Validate a form for creating a transaction.
    ///
    /// Category ownership is checked separately against the database.
    ///
    /// # Errors
    /// Returns [Error::MissingFields] if title, amount, type, date or category is missing,
    /// otherwise the error for the first invalid field.
    pub fn into_new_transaction(self) -> Result<NewTransaction, Error> {
        let (Some(title), Some(amount), Some(raw_type), Some(raw_date), Some(category_id)) = (
            self.title.as_deref().and_then(validate_title),
            self.amount,
            self.transaction_type.as_deref().filter(|value| !value.is_empty()),
            self.date.as_deref().filter(|value| !value.trim().is_empty()),
            self.category_id,
        ) else {
            return Err(Error::MissingFields);
        };

        Ok(NewTransaction {
            title,
            amount: validate_amount(amount)?,
            transaction_type: raw_type.parse()?,
            date: parse_date(raw_date)?,
            category_id,
            description: normalize_description(self.description.as_deref()),
        })
    }

    /// Validate the fields present in an edit.
    ///
    /// # Errors
    /// Returns the error for the first invalid field. A blank title counts as missing.
    pub fn into_update(self) -> Result<TransactionUpdate, Error> {
        let title = match self.title.as_deref() {
            Some(raw_title) => Some(validate_title(raw_title).ok_or(Error::MissingFields)?),
            None => None,
        };

        Ok(TransactionUpdate {
            title,
            amount: self.amount.map(validate_amount).transpose()?,
            transaction_type: self
                .transaction_type
                .as_deref()
                .map(str::parse)
                .transpose()?,
            date: self.date.as_deref().map(parse_date).transpose()?,
            category_id: self.category_id,
            description: self
                .description
                .as_deref()
                .map(|description| normalize_description(Some(description))),
        })
    }
}
