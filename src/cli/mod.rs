//! Command-line surface of the redditsaved application.
mod app;
mod args;

pub use app::*;
pub use args::*;
