//! Budget models and validation.

use serde::{Deserialize, Serialize};

use crate::{
    DatabaseId, Error,
    category::{CategoryId, CategoryName},
};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// A spending limit for one category in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the limit applies to.
    pub category_id: CategoryId,
    /// The name of the category, joined in from the category table.
    pub category_name: CategoryName,
    /// The most the user plans to spend in the category that month.
    pub monthly_limit: f64,
    /// The month from 1 to 12.
    pub month: u8,
    /// The year.
    pub year: i32,
}

/// A validated budget ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The category the limit applies to.
    pub category_id: CategoryId,
    /// A finite, non-negative limit.
    pub monthly_limit: f64,
    /// The month from 1 to 12.
    pub month: u8,
    /// The year.
    pub year: i32,
}

/// Whether storing a budget inserted a new row or replaced an existing limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetWrite {
    /// No budget existed for the category and month.
    Created,
    /// The limit of the existing budget was replaced.
    Updated,
}

/// The JSON body for setting a budget.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetForm {
    /// The ID of one of the user's categories.
    pub category_id: Option<CategoryId>,
    /// The limit as a JSON number.
    pub monthly_limit: Option<f64>,
    /// The month from 1 to 12.
    pub month: Option<i64>,
    /// The year.
    pub year: Option<i64>,
}

impl TryFrom<BudgetForm> for NewBudget {
    type Error = Error;

    fn try_from(form: BudgetForm) -> Result<Self, Self::Error> {
        let (Some(category_id), Some(monthly_limit), Some(month), Some(year)) =
            (form.category_id, form.monthly_limit, form.month, form.year)
        else {
            return Err(Error::MissingFields);
        };

        if !monthly_limit.is_finite() || monthly_limit < 0.0 {
            return Err(Error::InvalidLimit);
        }

        let month = u8::try_from(month)
            .ok()
            .filter(|month| (1..=12).contains(month))
            .ok_or(Error::InvalidMonthOrYear)?;
        let year = i32::try_from(year)
            .ok()
            .filter(|year| (1..=9999).contains(year))
            .ok_or(Error::InvalidMonthOrYear)?;

        Ok(NewBudget {
            category_id,
            monthly_limit,
            month,
            year,
        })
    }
}
