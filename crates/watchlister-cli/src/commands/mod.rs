pub mod app;
pub mod auth;
pub mod config;
pub mod list;
pub mod search;
pub mod share;
pub mod watch;
