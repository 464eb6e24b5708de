pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod password;
pub mod store;

pub use error::{Result, VaultError};
