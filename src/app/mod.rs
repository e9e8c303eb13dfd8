pub mod api;
pub mod cli;
pub mod commands;
mod context;
pub mod pipeline;

pub use context::AppContext;
