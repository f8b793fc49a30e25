//! Saved-items library for a Reddit account
//!
//! This library fetches the saved posts of an account, merges them with a
//! local snapshot, filters them by title and community, and renders the
//! result as an HTML report.

mod auth;
mod cli;
mod config;
mod errors;
mod fetcher;
mod filter;
mod helper;
mod item;
mod merge;
mod progress;
mod reddit;
mod report;
mod storage;
mod types;

// Re-export key components
pub use auth::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use fetcher::*;
pub use filter::*;
pub use helper::*;
pub use item::*;
pub use merge::*;
pub use progress::*;
pub use reddit::*;
pub use report::*;
pub use storage::*;
pub use types::*;
