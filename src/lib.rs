pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod staging;

pub use errors::{UpdateError, VcsError};
pub use models::{PatchOutcome, RunReport, StageOutcome, Token};
