pub mod config;
pub mod db;
pub mod error;

// Catalog queries: listing, search, filters
pub mod catalog;

// CSV export/import
pub mod export;

// HTTP surface
pub mod api;
pub mod web;

pub mod cli;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
