pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod github;
pub mod memory;
pub mod profiles;
pub mod state;
pub mod validation;
