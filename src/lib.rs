//! Personal TV show tracking: a TMDb-backed show cache, per-user watchlists,
//! watched-episode state and progress reporting on top of SQLite.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use app::App;
pub use config::Config;
pub use db::Repository;
pub use error::{AppError, Result};
