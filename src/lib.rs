pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod models;
pub mod reports;

pub use db::Database;
pub use error::ApiError;
