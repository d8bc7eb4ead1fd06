//! Movie catalog browsing core: a typed TMDB client, a debounced and
//! generation-guarded search session, and locally persisted favorites and
//! watchlist collections.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
