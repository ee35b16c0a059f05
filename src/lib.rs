pub mod calendar;
pub mod commands;
pub mod config;
pub mod error;
pub mod feeds;
pub mod insights;
pub mod model;
pub mod output;
pub mod store;
pub mod user;
