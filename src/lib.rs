//! User-profile backend: signup, login, token verification and profile
//! read/update behind a bearer-token guard.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use state::AppState;
