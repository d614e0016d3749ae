pub mod api;
pub mod assistant;
pub mod calendar;
pub mod config;
pub mod error;
pub mod utils;
