pub mod auth;
pub mod category;
pub mod email_template;
