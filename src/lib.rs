pub mod api;
pub mod clients;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod geo;
pub mod models;
