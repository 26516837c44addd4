//! AIdentify command-line front end

pub mod commands;
pub mod context;
pub mod progress;

pub use context::AppContext;
