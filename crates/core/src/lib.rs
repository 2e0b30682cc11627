//! Domain types and field rules shared by the database and API crates.

pub mod category;
pub mod email_template;
pub mod error;
pub mod types;
