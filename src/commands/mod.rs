pub mod auth;
pub mod calendar;
pub mod event;
pub mod feeds;
pub mod init;
pub mod insights;
pub mod search;
pub mod stack;
pub mod tag;
pub mod task;
