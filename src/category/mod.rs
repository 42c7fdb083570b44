//! Categories for grouping transactions and budgets, e.g. "Groceries" or "Salary".

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_category, create_category_table, delete_category, get_all_categories, get_category,
    get_category_by_name, rename_category,
};
pub use domain::{Category, CategoryForm, CategoryId, CategoryName};
pub use endpoints::{
    CategoryState, create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    rename_category_endpoint,
};
