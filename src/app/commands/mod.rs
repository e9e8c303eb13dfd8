pub mod catalog;
pub mod clone;
pub mod generate;
pub mod import;
pub mod sanitize;
pub mod validate;
